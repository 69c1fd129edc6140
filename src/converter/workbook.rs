use rust_xlsxwriter::Workbook;

use crate::converter::errors::ConvertError;

/// Serialize `rows` into a single-sheet xlsx workbook, every cell a string.
pub fn build_workbook(sheet_name: &str, rows: &[Vec<String>]) -> Result<Vec<u8>, ConvertError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(generation)?;

    for (r, row) in rows.iter().enumerate() {
        let r = u32::try_from(r).map_err(|_| too_large("rows"))?;
        for (c, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let c = u16::try_from(c).map_err(|_| too_large("columns"))?;
            worksheet.write_string(r, c, cell).map_err(generation)?;
        }
    }

    workbook.save_to_buffer().map_err(generation)
}

fn generation(err: rust_xlsxwriter::XlsxError) -> ConvertError {
    ConvertError::Generation(err.to_string())
}

fn too_large(what: &str) -> ConvertError {
    ConvertError::Generation(format!("too many {} for a worksheet", what))
}
