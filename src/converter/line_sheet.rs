use crate::config::EmptyOutputPolicy;
use crate::converter::{
    errors::ConvertError,
    strategy::{Converter, OutputFormat, RawDocument},
    text::document_lines,
    workbook::build_workbook,
};
use crate::packager::OutputPayload;

/// One single-cell spreadsheet row per non-blank text line.
#[derive(Debug, Clone, Default)]
pub struct LineSpreadsheetConverter {
    policy: EmptyOutputPolicy,
}

impl LineSpreadsheetConverter {
    pub fn new(policy: EmptyOutputPolicy) -> Self {
        Self { policy }
    }
}

impl Converter for LineSpreadsheetConverter {
    fn format(&self) -> OutputFormat {
        OutputFormat::LineSpreadsheet
    }

    fn convert(&self, document: RawDocument) -> Result<OutputPayload, ConvertError> {
        let rows: Vec<Vec<String>> = document_lines(&document, self.policy)?
            .into_iter()
            .map(|line| vec![line])
            .collect();

        let bytes = build_workbook(&document.sheet_name(), &rows)?;
        Ok(document.payload(bytes, self.format()))
    }
}
