pub mod errors;
pub mod layout;
pub mod line_doc;
pub mod line_sheet;
pub mod passthrough;
pub mod pdf;
pub mod registry;
pub mod strategy;
pub mod table_sheet;
pub mod text;
pub mod workbook;

#[cfg(test)]
mod tests;

pub use errors::ConvertError;
pub use line_doc::LineDocumentConverter;
pub use line_sheet::LineSpreadsheetConverter;
pub use passthrough::PassthroughConverter;
pub use registry::ConverterRegistry;
pub use strategy::{Converter, MIME_DOCX, MIME_PDF, MIME_XLSX, OutputFormat, RawDocument};
pub use table_sheet::TableSpreadsheetConverter;
