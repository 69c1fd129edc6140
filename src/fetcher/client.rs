use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use reqwest::{
    Client, ClientBuilder, Response,
    header::{ACCEPT, CONTENT_TYPE, REFERER},
};
use tracing::{debug, instrument};
use url::Url;

use crate::config::Config;
use crate::fetcher::{
    charset, errors::FetchError, source::DocumentSource, types::ListingPage,
};

const MAX_REDIRECTS: usize = 10;
const LISTING_ACCEPT: &str = "text/html,application/xhtml+xml";
const DOCUMENT_ACCEPT: &str = "application/pdf";

/// `DocumentSource` backed by a real HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    listing_url: Url,
    max_listing_bytes: u64,
    max_document_bytes: u64,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .user_agent(config.user_agent())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(FetchError::from_reqwest_error)?;

        Ok(Self {
            client,
            listing_url: config.listing_url().clone(),
            max_listing_bytes: config.max_listing_bytes(),
            max_document_bytes: config.max_document_bytes(),
        })
    }
}

#[async_trait]
impl DocumentSource for HttpFetcher {
    #[instrument(skip_all, fields(url = %self.listing_url))]
    async fn fetch_listing(&self) -> Result<ListingPage, FetchError> {
        let response = self
            .client
            .get(self.listing_url.clone())
            .header(ACCEPT, LISTING_ACCEPT)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let url_final = response.url().clone();
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http { status });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(str::to_owned);

        let body = read_body(response, self.max_listing_bytes).await?;
        let (html, encoding) = charset::decode_html(content_type.as_deref(), &body);

        debug!(
            "Fetched listing from {} ({} bytes, {})",
            url_final,
            body.len(),
            encoding.name()
        );

        Ok(ListingPage {
            url_final,
            status,
            html,
            encoding: encoding.name(),
            fetched_at: Utc::now(),
        })
    }

    #[instrument(skip_all, fields(url = %url))]
    async fn fetch_document(&self, url: &Url) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(REFERER, self.listing_url.as_str())
            .header(ACCEPT, DOCUMENT_ACCEPT)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http { status });
        }

        let final_url = response.url().clone();
        let body = read_body(response, self.max_document_bytes).await?;
        debug!("Downloaded {} bytes from {}", body.len(), final_url);
        Ok(body)
    }
}

/// Read the whole body, refusing to buffer more than `limit` bytes.
async fn read_body(mut response: Response, limit: u64) -> Result<Bytes, FetchError> {
    // Check content length before downloading
    if let Some(content_length) = response.content_length()
        && content_length > limit
    {
        return Err(FetchError::BodyTooLarge {
            size: content_length,
            limit,
        });
    }

    let mut body = BytesMut::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(FetchError::from_reqwest_error)?
    {
        let size = (body.len() + chunk.len()) as u64;
        if size > limit {
            return Err(FetchError::BodyTooLarge { size, limit });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}
