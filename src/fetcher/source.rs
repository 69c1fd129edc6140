use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::fetcher::{errors::FetchError, types::ListingPage};

/// The two network calls the pipeline makes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Retrieve the configured listing page.
    async fn fetch_listing(&self) -> Result<ListingPage, FetchError>;

    /// Download a document's bytes, following redirects.
    async fn fetch_document(&self, url: &Url) -> Result<Bytes, FetchError>;
}
