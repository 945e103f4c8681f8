//! Canonical Berlin districts and their surface-form synonyms.

/// Canonical district followed by the names that map to it.
///
/// Order matters: input is matched against districts top to bottom and the
/// first synonym contained in the input wins.
pub const BERLIN_DISTRICTS: &[(&str, &[&str])] = &[
    ("charlottenburg", &["charlottenburg", "wilmersdorf", "charlottenburg-wilmersdorf"]),
    ("friedrichshain", &["friedrichshain", "kreuzberg", "friedrichshain-kreuzberg"]),
    ("lichtenberg", &["lichtenberg"]),
    ("marzahn", &["marzahn", "hellersdorf", "marzahn-hellersdorf"]),
    ("mitte", &["mitte"]),
    ("neukölln", &["neukölln"]),
    ("pankow", &["pankow", "prenzlauer berg", "weißensee"]),
    ("reinickendorf", &["reinickendorf"]),
    ("spandau", &["spandau"]),
    ("steglitz", &["steglitz", "zehlendorf", "steglitz-zehlendorf"]),
    ("tempelhof", &["tempelhof", "schöneberg", "tempelhof-schöneberg"]),
    ("treptow", &["treptow", "köpenick", "treptow-köpenick"]),
];

/// Map free text to its canonical district.
///
/// Unrecognized input is returned lower-cased and trimmed.
pub fn normalize(text: &str) -> String {
    let district = text.to_lowercase();
    let district = district.trim();

    BERLIN_DISTRICTS
        .iter()
        .find(|(_, synonyms)| synonyms.iter().any(|s| district.contains(s)))
        .map(|(canonical, _)| (*canonical).to_string())
        .unwrap_or_else(|| district.to_string())
}
