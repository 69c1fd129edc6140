//! The latest-document pipeline.
//!
//! One linear run per request: fetch the listing, pick the newest link,
//! download it, convert it. Nothing is cached or shared between runs.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::converter::{ConvertError, Converter, RawDocument};
use crate::error::PipelineError;
use crate::fetcher::{DocumentSource, FetchError, HttpFetcher};
use crate::listing::{DocumentReference, extract_links, select_latest};
use crate::packager::OutputPayload;

pub struct LatestDocumentPipeline {
    source: Arc<dyn DocumentSource>,
    link_base: Url,
    redirect_marker: String,
}

impl LatestDocumentPipeline {
    pub fn new(config: &Config, source: Arc<dyn DocumentSource>) -> Self {
        Self {
            source,
            link_base: config.link_base(),
            redirect_marker: config.redirect_marker().to_string(),
        }
    }

    /// Pipeline fetching over HTTP.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(config)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Fetch the listing and return its newest document link.
    pub async fn resolve_latest(&self) -> Result<DocumentReference, PipelineError> {
        let listing = self
            .source
            .fetch_listing()
            .await
            .map_err(PipelineError::ListingUnavailable)?;

        debug!(
            status = %listing.status,
            encoding = %listing.encoding,
            fetched_at = %listing.fetched_at,
            "Listing page {} received",
            listing.url_final
        );

        let candidates = extract_links(&listing.html, &self.link_base, &self.redirect_marker);
        let Some(latest) = select_latest(&candidates) else {
            warn!(
                "No links containing {:?} on {}; the listing markup may have changed",
                self.redirect_marker, listing.url_final
            );
            return Err(PipelineError::NoCandidatesFound);
        };

        info!(
            "Selected {:?} ({}) out of {} candidate(s)",
            latest.display_name,
            latest.url,
            candidates.len()
        );
        Ok(latest.clone())
    }

    pub async fn download(&self, reference: DocumentReference) -> Result<RawDocument, PipelineError> {
        let bytes = self
            .source
            .fetch_document(&reference.url)
            .await
            .map_err(PipelineError::DownloadFailed)?;

        let document = RawDocument::new(reference, bytes);
        info!(
            "Downloaded {} bytes (md5 {:x})",
            document.bytes.len(),
            md5::compute(&document.bytes)
        );
        if !document.looks_like_pdf() {
            warn!("Downloaded payload does not start with a PDF signature");
        }
        Ok(document)
    }

    /// Resolve, download and convert the latest document with `converter`.
    #[instrument(skip_all, fields(run_id = %Uuid::new_v4(), format = %converter.format()))]
    pub async fn run(&self, converter: Arc<dyn Converter>) -> Result<OutputPayload, PipelineError> {
        let latest = self.resolve_latest().await?;
        let document = self.download(latest).await?;
        let payload = convert(converter, document).await?;

        info!("Serving {} ({} bytes)", payload.filename, payload.bytes.len());
        Ok(payload)
    }
}

/// Run the converter on the blocking pool; a panic inside it becomes a
/// conversion failure.
async fn convert(
    converter: Arc<dyn Converter>,
    document: RawDocument,
) -> Result<OutputPayload, PipelineError> {
    let result = tokio::task::spawn_blocking(move || converter.convert(document))
        .await
        .map_err(|e| ConvertError::Task(e.to_string()))?;
    Ok(result?)
}
