#![allow(dead_code)]

use axum::Router;
use url::Url;
use wiremock::MockServer;

use latestdoc::{app_state::AppState, config::Config, routes};

#[path = "fixtures/pdf.rs"]
mod pdf_fixtures;

pub use pdf_fixtures::build_pdf;

pub const LISTING_PATH: &str = "/view.php";

/// Config pointing the service at `server`.
pub fn config_for(server: &MockServer) -> Config {
    let listing_url = Url::parse(&format!("{}{}?theme=VR_of_RFMO&id=10", server.uri(), LISTING_PATH))
        .unwrap();
    Config::new("127.0.0.1:0", listing_url)
}

pub fn test_app(config: Config) -> Router {
    let state = AppState::new(config).unwrap();
    routes::router(state)
}

/// A listing page with one `<li><a>` per (href, text) pair.
pub fn listing_html(links: &[(&str, &str)]) -> String {
    let items: String = links
        .iter()
        .map(|(href, text)| format!("<li><a href=\"{}\">{}</a></li>\n", href, text))
        .collect();
    format!("<html><body><ul>\n{}</ul></body></html>", items)
}

/// A one-page vessel list laid out as a three column table.
pub fn vessel_list_pdf() -> Vec<u8> {
    build_pdf(&[vec![
        (50, 700, "Vessel"),
        (200, 700, "Flag"),
        (350, 700, "Listed"),
        (50, 680, "Hai Feng 1"),
        (200, 680, "TW"),
        (350, 680, "20240601"),
        (50, 660, "Ocean Star"),
        (200, 660, "PA"),
        (350, 660, "20240315"),
    ]])
}
