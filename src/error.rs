use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::converter::ConvertError;
use crate::documents::dtos::ErrorResponse;
use crate::fetcher::FetchError;

/// Why a latest-document request failed.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("listing page unavailable: {0}")]
    ListingUnavailable(#[source] FetchError),

    /// Usually means the listing page markup changed.
    #[error("no document links found on listing page")]
    NoCandidatesFound,

    #[error("failed to download document: {0}")]
    DownloadFailed(#[source] FetchError),

    #[error("no rows extracted from document")]
    ExtractionEmpty,

    #[error("conversion failed: {0}")]
    ConversionFailure(String),
}

impl PipelineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DownloadFailed(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status the remote server answered with, when one was received.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            Self::ListingUnavailable(e) | Self::DownloadFailed(e) => e.status(),
            _ => None,
        }
    }
}

impl From<ConvertError> for PipelineError {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::Empty => Self::ExtractionEmpty,
            other => Self::ConversionFailure(other.to_string()),
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        error!(
            upstream_status = ?self.upstream_status(),
            "Request failed with {}: {}",
            status,
            self
        );

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
