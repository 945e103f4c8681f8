use std::io::Read as _;
use std::sync::mpsc;
use std::thread;

use wbm_scout::models::{berlin_now, ListingRecord};
use wbm_scout::notifiers::{Notifier, NotifyError, TelegramNotifier};
use wbm_scout::scrapers::{FetchError, PageFetcher, WbmFetcher};

struct Captured {
    method: String,
    url: String,
    body: String,
}

/// Serve a single request with `status`/`body` and report what was received
fn serve_once(status: u16, body: &'static str) -> (String, mpsc::Receiver<Captured>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
    let base_url = format!("http://{}", server.server_addr());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let mut request = match server.recv() {
            Ok(request) => request,
            Err(_) => return,
        };
        let mut received = String::new();
        let _ = request.as_reader().read_to_string(&mut received);
        let _ = tx.send(Captured {
            method: request.method().to_string(),
            url: request.url().to_string(),
            body: received,
        });
        let _ = request.respond(tiny_http::Response::from_string(body).with_status_code(status));
    });

    (base_url, rx)
}

fn listing() -> ListingRecord {
    ListingRecord {
        id: "4-12-00023-0815".to_string(),
        title: "Helle Wohnung".to_string(),
        address: "Schönhauser Allee 10, Bezirk: Prenzlauer Berg".to_string(),
        district: "pankow".to_string(),
        rooms: 2.0,
        area: 65.0,
        rent: 1200.5,
        price_per_sqm: 18.47,
        available_from: "01.09.2025".to_string(),
        url: "https://www.wbm.de/wohnungen-berlin/angebote/details/4-12-00023-0815/".to_string(),
        found_at: berlin_now().fixed_offset(),
    }
}

#[tokio::test]
async fn fetcher_returns_page_body() {
    let (base_url, rx) = serve_once(200, "<html><body>angebote</body></html>");
    let fetcher = WbmFetcher::with_url(format!("{base_url}/wohnungen-berlin/angebote/")).unwrap();

    let html = fetcher.fetch_page().await.unwrap();

    assert_eq!(html, "<html><body>angebote</body></html>");
    let captured = rx.recv().unwrap();
    assert_eq!(captured.method, "GET");
    assert_eq!(captured.url, "/wohnungen-berlin/angebote/");
}

#[tokio::test]
async fn fetcher_reports_error_status() {
    let (base_url, _rx) = serve_once(503, "maintenance");
    let fetcher = WbmFetcher::with_url(base_url).unwrap();

    match fetcher.fetch_page().await {
        Err(FetchError::Status { status, .. }) => assert_eq!(status.as_u16(), 503),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetcher_reports_transport_failure() {
    // bind then drop so the port is closed when the request goes out
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let fetcher = WbmFetcher::with_url(format!("http://127.0.0.1:{port}/")).unwrap();

    match fetcher.fetch_page().await {
        Err(FetchError::Http { url, .. }) => assert_eq!(url, format!("http://127.0.0.1:{port}/")),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn telegram_posts_markdown_message_to_chat() {
    let (base_url, rx) = serve_once(200, r#"{"ok":true,"result":{"message_id":1}}"#);
    let notifier = TelegramNotifier::with_api_base(base_url, "123:abc", "-10042").unwrap();

    notifier.notify(&listing()).await.unwrap();

    let captured = rx.recv().unwrap();
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.url, "/bot123:abc/sendMessage");

    let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(body["chat_id"], "-10042");
    assert_eq!(body["parse_mode"], "Markdown");
    assert_eq!(body["disable_web_page_preview"], false);
    let text = body["text"].as_str().unwrap();
    assert!(text.contains("*Helle Wohnung*"));
    assert!(text.contains("details/4-12-00023-0815/"));
}

#[tokio::test]
async fn telegram_rejection_is_an_error() {
    let (base_url, _rx) = serve_once(400, r#"{"ok":false,"description":"Bad Request: chat not found"}"#);
    let notifier = TelegramNotifier::with_api_base(base_url, "123:abc", "-1").unwrap();

    match notifier.notify(&listing()).await {
        Err(NotifyError::Api { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("chat not found"));
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn telegram_ok_false_is_an_error() {
    let (base_url, _rx) = serve_once(200, r#"{"ok":false,"description":"message is too long"}"#);
    let notifier = TelegramNotifier::with_api_base(base_url, "123:abc", "-1").unwrap();

    match notifier.notify(&listing()).await {
        Err(NotifyError::Api { body, .. }) => assert_eq!(body, "message is too long"),
        other => panic!("expected api error, got {other:?}"),
    }
}
