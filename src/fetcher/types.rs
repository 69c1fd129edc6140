use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use url::Url;

/// The listing page as received, decoded to UTF-8.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub url_final: Url,
    pub status: StatusCode,
    pub html: String,
    /// Name of the encoding the body was decoded from.
    pub encoding: &'static str,
    pub fetched_at: DateTime<Utc>,
}
