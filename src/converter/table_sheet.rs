use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::converter::{
    errors::ConvertError,
    pdf::{self, PageTables},
    strategy::{Converter, OutputFormat, RawDocument},
    workbook::build_workbook,
};
use crate::packager::OutputPayload;

/// Exports every table found in the PDF layout to one worksheet.
#[derive(Debug, Clone)]
pub struct TableSpreadsheetConverter {
    scratch_dir: PathBuf,
}

impl TableSpreadsheetConverter {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Every table row of the PDF in `bytes`, in page, table, row order.
    ///
    /// The bytes are staged in a scratch file unique to this call, deleted
    /// when it goes out of scope whether decoding succeeds, fails or panics.
    pub fn table_rows(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>, ConvertError> {
        let mut scratch = tempfile::Builder::new()
            .prefix("latestdoc-")
            .suffix(".pdf")
            .tempfile_in(&self.scratch_dir)?;
        scratch.write_all(bytes)?;
        scratch.flush()?;

        debug!("Staged {} bytes at {}", bytes.len(), scratch.path().display());
        pdf::extract_tables(scratch.path()).map(flatten_tables)
    }
}

/// All rows of all tables: page order, then table order, then row order.
pub fn flatten_tables(pages: Vec<PageTables>) -> Vec<Vec<String>> {
    pages
        .into_iter()
        .flat_map(|page| page.tables)
        .flatten()
        .collect()
}

impl Converter for TableSpreadsheetConverter {
    fn format(&self) -> OutputFormat {
        OutputFormat::TableSpreadsheet
    }

    fn convert(&self, document: RawDocument) -> Result<OutputPayload, ConvertError> {
        let rows = self.table_rows(&document.bytes)?;
        if rows.is_empty() {
            return Err(ConvertError::Empty);
        }

        debug!("Writing {} table rows", rows.len());
        let bytes = build_workbook(&document.sheet_name(), &rows)?;
        Ok(document.payload(bytes, self.format()))
    }
}
