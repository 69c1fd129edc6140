use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow, WidthType};

use crate::config::EmptyOutputPolicy;
use crate::converter::{
    errors::ConvertError,
    strategy::{Converter, OutputFormat, RawDocument},
    text::document_lines,
};
use crate::packager::OutputPayload;

/// Table width in fiftieths of a percent: the full text width.
const FULL_WIDTH_PCT: usize = 5000;

/// A word-processing document holding a single-column table, one row per
/// non-blank text line.
#[derive(Debug, Clone, Default)]
pub struct LineDocumentConverter {
    policy: EmptyOutputPolicy,
}

impl LineDocumentConverter {
    pub fn new(policy: EmptyOutputPolicy) -> Self {
        Self { policy }
    }
}

/// Serialize `lines` into a docx package.
pub fn build_document(lines: &[String]) -> Result<Vec<u8>, ConvertError> {
    let mut docx = Docx::new();

    // A table needs at least one row to be valid
    if !lines.is_empty() {
        let rows = lines
            .iter()
            .map(|line| {
                let paragraph = Paragraph::new().add_run(Run::new().add_text(line.as_str()));
                TableRow::new(vec![TableCell::new().add_paragraph(paragraph)])
            })
            .collect();
        docx = docx.add_table(Table::new(rows).width(FULL_WIDTH_PCT, WidthType::Pct));
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ConvertError::Generation(e.to_string()))?;
    Ok(buffer.into_inner())
}

impl Converter for LineDocumentConverter {
    fn format(&self) -> OutputFormat {
        OutputFormat::LineDocument
    }

    fn convert(&self, document: RawDocument) -> Result<OutputPayload, ConvertError> {
        let lines = document_lines(&document, self.policy)?;
        let bytes = build_document(&lines)?;
        Ok(document.payload(bytes, self.format()))
    }
}
