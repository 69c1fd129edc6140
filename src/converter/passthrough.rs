use crate::converter::{
    errors::ConvertError,
    strategy::{Converter, OutputFormat, RawDocument},
};
use crate::packager::OutputPayload;

/// Serves the downloaded PDF as-is.
#[derive(Debug, Clone, Default)]
pub struct PassthroughConverter;

impl Converter for PassthroughConverter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn convert(&self, document: RawDocument) -> Result<OutputPayload, ConvertError> {
        Ok(document.payload(document.bytes.clone(), self.format()))
    }
}
