use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::converter::errors::ConvertError;
use crate::listing::{DateToken, DocumentReference, extract_date_token};
use crate::packager::OutputPayload;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Sheet name used when the display name carries no date token.
pub const FALLBACK_SHEET_NAME: &str = "Sheet1";

/// The representations a document can be served in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// The downloaded PDF, unchanged.
    Pdf,
    /// Tables found in the PDF layout, as one spreadsheet.
    #[serde(rename = "xlsx")]
    TableSpreadsheet,
    /// One spreadsheet row per non-blank text line.
    #[serde(rename = "lines-xlsx")]
    LineSpreadsheet,
    /// One word-processing table row per non-blank text line.
    #[serde(rename = "docx")]
    LineDocument,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Pdf,
        OutputFormat::TableSpreadsheet,
        OutputFormat::LineSpreadsheet,
        OutputFormat::LineDocument,
    ];

    /// Path segment naming this format in `/api/latest/{format}`.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::TableSpreadsheet => "xlsx",
            Self::LineSpreadsheet => "lines-xlsx",
            Self::LineDocument => "docx",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::TableSpreadsheet | Self::LineSpreadsheet => "xlsx",
            Self::LineDocument => "docx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => MIME_PDF,
            Self::TableSpreadsheet | Self::LineSpreadsheet => MIME_XLSX,
            Self::LineDocument => MIME_DOCX,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown output format: {}", s))
    }
}

/// A downloaded document awaiting conversion.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub reference: DocumentReference,
    pub bytes: Bytes,
}

impl RawDocument {
    pub fn new(reference: DocumentReference, bytes: Bytes) -> Self {
        Self { reference, bytes }
    }

    pub fn date_token(&self) -> DateToken {
        extract_date_token(&self.reference.display_name)
    }

    /// The date token's digits, or [`FALLBACK_SHEET_NAME`].
    pub fn sheet_name(&self) -> String {
        match self.date_token().value() {
            Some(_) => self.date_token().to_string(),
            None => FALLBACK_SHEET_NAME.to_string(),
        }
    }

    /// Whether the payload starts with the `%PDF` signature.
    pub fn looks_like_pdf(&self) -> bool {
        self.bytes
            .iter()
            .skip_while(|b| b.is_ascii_whitespace())
            .take(4)
            .copied()
            .eq(*b"%PDF")
    }

    /// Payload for this document in `format`, named after its display name.
    pub fn payload(&self, bytes: impl Into<Bytes>, format: OutputFormat) -> OutputPayload {
        OutputPayload::new(
            bytes,
            &self.reference.display_name,
            format.extension(),
            format.mime_type(),
        )
    }
}

/// A pluggable transformation from a downloaded document to an output payload.
///
/// Implementations are synchronous and run on the blocking pool; they must
/// not touch transport concerns.
pub trait Converter: Send + Sync + 'static {
    /// The format this converter produces.
    fn format(&self) -> OutputFormat;

    /// Convert the document, consuming it.
    fn convert(&self, document: RawDocument) -> Result<OutputPayload, ConvertError>;
}
