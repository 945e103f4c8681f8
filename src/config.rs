use crate::filter::FilterConfig;
use crate::schedule::{ActiveDays, ScheduleWindow};
use crate::scrapers::wbm::OFFERS_URL;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Telegram bot credentials
#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` runs without Telegram and logs matches instead
    pub telegram: Option<TelegramConfig>,
    pub filter: FilterConfig,
    pub schedule: ScheduleWindow,
    pub data_file: PathBuf,
    pub source_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let telegram = match var("TELEGRAM_TOKEN") {
            Some(token) => Some(TelegramConfig {
                token,
                chat_id: var("TELEGRAM_CHAT_ID")
                    .context("TELEGRAM_CHAT_ID must be set when TELEGRAM_TOKEN is set")?,
            }),
            None => None,
        };

        let filter = FilterConfig {
            min_rooms: parse_bound(&var, "MIN_ROOMS", 1.0)?,
            max_rooms: parse_bound(&var, "MAX_ROOMS", 5.0)?,
            min_area: parse_bound(&var, "MIN_AREA", 20.0)?,
            max_area: parse_bound(&var, "MAX_AREA", 200.0)?,
            max_rent: parse_bound(&var, "MAX_RENT", 2000.0)?,
            max_price_per_sqm: parse_bound(&var, "MAX_PRICE_PER_SQM", 20.0)?,
            districts: FilterConfig::parse_districts(&var("DISTRICTS").unwrap_or_default()),
        };

        let days: ActiveDays = var("SCHEDULE_DAYS")
            .unwrap_or_else(|| "mon-sun".to_string())
            .parse()
            .context("SCHEDULE_DAYS must be mon-sun, mon-fri or a list like mon,wed,fri")?;
        let schedule = ScheduleWindow::new(
            parse_or(&var, "SCHEDULE_MINUTES", 5)?,
            parse_or(&var, "SCHEDULE_START_HOUR", 8)?,
            parse_or(&var, "SCHEDULE_END_HOUR", 23)?,
            days,
        )
        .context("Invalid SCHEDULE_MINUTES, SCHEDULE_START_HOUR or SCHEDULE_END_HOUR")?;

        Ok(Self {
            telegram,
            filter,
            schedule,
            data_file: var("DATA_FILE")
                .unwrap_or_else(|| "wohnungen.json".to_string())
                .into(),
            source_url: var("SOURCE_URL").unwrap_or_else(|| OFFERS_URL.to_string()),
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid number, got {value:?}")),
        None => Ok(default),
    }
}

/// Filter bounds must be finite
fn parse_bound<F>(var: &F, key: &str, default: f64) -> Result<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let value: f64 = parse_or(var, key, default)?;
    if !value.is_finite() {
        anyhow::bail!("{key} must be a finite number, got {value}");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config(&[]).unwrap();

        assert_eq!(config.telegram, None);
        assert_eq!(config.filter, FilterConfig::default());
        assert_eq!(config.schedule.interval_minutes, 5);
        assert_eq!(config.schedule.start_hour, 8);
        assert_eq!(config.schedule.end_hour, 23);
        assert_eq!(config.schedule.days, ActiveDays::Every);
        assert_eq!(config.data_file, PathBuf::from("wohnungen.json"));
        assert_eq!(config.source_url, OFFERS_URL);
    }

    #[test]
    fn reads_filter_and_schedule() {
        let config = config(&[
            ("TELEGRAM_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-10042"),
            ("MIN_ROOMS", "2"),
            ("MAX_RENT", "1100.5"),
            ("DISTRICTS", "Mitte, Pankow,"),
            ("SCHEDULE_MINUTES", "10"),
            ("SCHEDULE_DAYS", "mon-fri"),
            ("DATA_FILE", "/data/known.json"),
        ])
        .unwrap();

        assert_eq!(
            config.telegram,
            Some(TelegramConfig {
                token: "123:abc".to_string(),
                chat_id: "-10042".to_string(),
            })
        );
        assert_eq!(config.filter.min_rooms, 2.0);
        assert_eq!(config.filter.max_rent, 1100.5);
        assert_eq!(config.filter.districts, vec!["Mitte", "Pankow"]);
        assert_eq!(config.schedule.interval_minutes, 10);
        assert_eq!(config.schedule.days, ActiveDays::Weekdays);
        assert_eq!(config.data_file, PathBuf::from("/data/known.json"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config(&[("MAX_AREA", " "), ("TELEGRAM_TOKEN", "")]).unwrap();
        assert_eq!(config.filter.max_area, 200.0);
        assert_eq!(config.telegram, None);
    }

    #[test]
    fn invalid_number_names_the_variable() {
        let err = config(&[("MAX_RENT", "viel")]).unwrap_err();
        assert!(err.to_string().contains("MAX_RENT"));
    }

    #[test]
    fn non_finite_bounds_are_rejected() {
        let err = config(&[("MAX_RENT", "NaN")]).unwrap_err();
        assert!(err.to_string().contains("MAX_RENT"));
        assert!(config(&[("MIN_ROOMS", "nan")]).is_err());
        assert!(config(&[("MAX_AREA", "inf")]).is_err());
        assert!(config(&[("MAX_PRICE_PER_SQM", "-infinity")]).is_err());
    }

    #[test]
    fn oversized_interval_is_rejected() {
        let err = config(&[("SCHEDULE_MINUTES", "18446744073709551615")]).unwrap_err();
        assert!(err.to_string().contains("SCHEDULE_MINUTES"));
    }

    #[test]
    fn token_without_chat_id_is_rejected() {
        assert!(config(&[("TELEGRAM_TOKEN", "123:abc")]).is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(config(&[("SCHEDULE_MINUTES", "0")]).is_err());
    }
}
