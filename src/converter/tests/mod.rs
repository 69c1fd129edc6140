use bytes::Bytes;
use lopdf::content::Operation;
use lopdf::{Object, Stream, StringFormat, dictionary};
use tempfile::TempDir;
use url::Url;

use crate::config::EmptyOutputPolicy;
use crate::converter::{
    ConvertError, Converter, LineDocumentConverter, LineSpreadsheetConverter, MIME_DOCX,
    MIME_PDF, MIME_XLSX, PassthroughConverter, RawDocument, TableSpreadsheetConverter, pdf,
    table_sheet::flatten_tables, text::document_lines,
};
use crate::listing::DocumentReference;

#[path = "../../../tests/fixtures/pdf.rs"]
mod fixtures;

use fixtures::{PdfBuilder, Placed, build_pdf, courier_operations, show_at};

fn raw_document(name: &str, bytes: Vec<u8>) -> RawDocument {
    let url = Url::parse("https://en.fa.gov.tw/redirect_file.php?id=42").unwrap();
    RawDocument::new(DocumentReference::new(name, url), Bytes::from(bytes))
}

fn vessel_pages() -> Vec<Vec<Placed<'static>>> {
    vec![
        vec![
            (72, 780, "IUU Vessel List"),
            (72, 740, "No."),
            (120, 740, "Name"),
            (320, 740, "Flag"),
            (72, 720, "1"),
            (120, 720, "Ocean Star"),
            (320, 720, "Unknown"),
            (72, 680, "Notes follow below."),
            (72, 640, "Code"),
            (200, 640, "Meaning"),
            (72, 620, "U"),
            (200, 620, "Unknown flag"),
        ],
        vec![
            (72, 780, "No."),
            (120, 780, "Name"),
            (320, 780, "Flag"),
            (72, 760, "2"),
            (120, 760, "Blue Fin"),
            (320, 760, "Belize"),
        ],
    ]
}

fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

#[test]
fn tables_are_read_across_pages_in_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vessels.pdf");
    std::fs::write(&path, build_pdf(&vessel_pages())).unwrap();

    let pages = pdf::extract_tables(&path).unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].tables.len(), 2);
    assert_eq!(pages[1].tables.len(), 1);

    assert_eq!(
        flatten_tables(pages),
        vec![
            strings(&["No.", "Name", "Flag"]),
            strings(&["1", "Ocean Star", "Unknown"]),
            strings(&["Code", "Meaning"]),
            strings(&["U", "Unknown flag"]),
            strings(&["No.", "Name", "Flag"]),
            strings(&["2", "Blue Fin", "Belize"]),
        ]
    );
}

#[test]
fn table_export_writes_named_workbook() {
    let scratch = TempDir::new().unwrap();
    let converter = TableSpreadsheetConverter::new(scratch.path());
    let document = raw_document("IUU Vessel List (20240601)", build_pdf(&vessel_pages()));

    let payload = converter.convert(document).unwrap();
    assert_eq!(payload.mime_type, MIME_XLSX);
    assert_eq!(payload.filename, "IUU_Vessel_List_20240601.xlsx");
    assert!(payload.bytes.starts_with(b"PK"));
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn table_export_without_tables_is_empty() {
    let scratch = TempDir::new().unwrap();
    let converter = TableSpreadsheetConverter::new(scratch.path());
    let pdf = build_pdf(&[vec![(72, 700, "Just a paragraph."), (72, 680, "And another.")]]);

    let result = converter.convert(raw_document("notice 20240101", pdf));
    assert!(matches!(result, Err(ConvertError::Empty)));
}

#[test]
fn scratch_file_is_removed_when_decoding_fails() {
    let scratch = TempDir::new().unwrap();
    let converter = TableSpreadsheetConverter::new(scratch.path());

    let result = converter.convert(raw_document("broken", b"<html>not a pdf</html>".to_vec()));
    assert!(matches!(result, Err(ConvertError::Decode(_))));
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn missing_scratch_dir_is_an_io_error() {
    let scratch = TempDir::new().unwrap();
    let converter = TableSpreadsheetConverter::new(scratch.path().join("missing"));

    let result = converter.convert(raw_document("x", build_pdf(&vessel_pages())));
    assert!(matches!(result, Err(ConvertError::Io(_))));
}

#[test]
fn passthrough_keeps_bytes() {
    let bytes = build_pdf(&vessel_pages());
    let payload = PassthroughConverter
        .convert(raw_document("Annual Report (2024) — 日本", bytes.clone()))
        .unwrap();

    assert_eq!(payload.bytes.as_ref(), bytes.as_slice());
    assert_eq!(payload.mime_type, MIME_PDF);
    assert_eq!(payload.filename, "Annual_Report_2024_.pdf");
}

#[test]
fn line_text_has_no_blank_lines() {
    let pdf = build_pdf(&[vec![(72, 700, "Alpha"), (72, 600, "Beta")]]);
    let lines = document_lines(&raw_document("x", pdf), EmptyOutputPolicy::Allow).unwrap();

    assert!(lines.iter().any(|line| line.contains("Alpha")));
    assert!(lines.iter().any(|line| line.contains("Beta")));
    assert!(lines.iter().all(|line| !line.trim().is_empty()));
}

#[test]
fn line_exports_produce_their_formats() {
    let pdf = build_pdf(&[vec![(72, 700, "Alpha"), (72, 600, "Beta")]]);

    let sheet = LineSpreadsheetConverter::new(EmptyOutputPolicy::Allow)
        .convert(raw_document("lines 20240601", pdf.clone()))
        .unwrap();
    assert_eq!(sheet.mime_type, MIME_XLSX);
    assert_eq!(sheet.filename, "lines_20240601.xlsx");
    assert!(sheet.bytes.starts_with(b"PK"));

    let doc = LineDocumentConverter::new(EmptyOutputPolicy::Allow)
        .convert(raw_document("lines 20240601", pdf))
        .unwrap();
    assert_eq!(doc.mime_type, MIME_DOCX);
    assert_eq!(doc.filename, "lines_20240601.docx");
    assert!(doc.bytes.starts_with(b"PK"));
}

#[test]
fn empty_line_policy_is_honoured() {
    let blank = build_pdf(&[Vec::new()]);

    let allowed = LineSpreadsheetConverter::new(EmptyOutputPolicy::Allow)
        .convert(raw_document("blank", blank.clone()));
    assert!(allowed.is_ok());

    let rejected = LineSpreadsheetConverter::new(EmptyOutputPolicy::Reject)
        .convert(raw_document("blank", blank.clone()));
    assert!(matches!(rejected, Err(ConvertError::Empty)));

    let rejected = LineDocumentConverter::new(EmptyOutputPolicy::Reject)
        .convert(raw_document("blank", blank));
    assert!(matches!(rejected, Err(ConvertError::Empty)));
}

/// ToUnicode CMap for an Identity-H font: glyphs 1..=4 are N, a, F, l.
const NAFL_CMAP: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS)
/Supplement 0
>> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
4 beginbfchar
<0001> <004E>
<0002> <0061>
<0003> <0046>
<0004> <006C>
endbfchar
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

fn glyphs(ids: &[u8]) -> Object {
    let bytes = ids.iter().flat_map(|id| [0, *id]).collect();
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn tables_of(pdf_bytes: Vec<u8>) -> Vec<Vec<String>> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.pdf");
    std::fs::write(&path, pdf_bytes).unwrap();
    flatten_tables(pdf::extract_tables(&path).unwrap())
}

#[test]
fn identity_encoded_fonts_decode_through_to_unicode() {
    let mut builder = PdfBuilder::new();
    let cmap_id = builder.add_object(Stream::new(dictionary! {}, NAFL_CMAP.to_vec()));
    let font_id = builder.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "NotoSansCJK-Subset",
        "Encoding" => "Identity-H",
        "ToUnicode" => cmap_id,
    });
    let resources = dictionary! { "Font" => dictionary! { "F1" => font_id } };

    let mut operations = Vec::new();
    operations.extend(show_at(72, 700, glyphs(&[1, 2])));
    operations.extend(show_at(200, 700, glyphs(&[3, 4])));
    operations.extend(show_at(72, 680, glyphs(&[2])));
    operations.extend(show_at(200, 680, glyphs(&[4])));
    builder.add_page(resources, operations);

    assert_eq!(
        tables_of(builder.finish()),
        vec![strings(&["Na", "Fl"]), strings(&["a", "l"])]
    );
}

#[test]
fn text_inside_form_xobjects_is_placed_by_the_form_matrix() {
    let mut builder = PdfBuilder::new();
    let resources = builder.courier_resources();

    let body = lopdf::content::Content {
        operations: courier_operations(&[
            (0, 40, "No."),
            (100, 40, "Name"),
            (0, 20, "1"),
            (100, 20, "Ocean Star"),
        ]),
    };
    let form_id = builder.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 300.into(), 100.into()],
            "Matrix" => vec![1.into(), 0.into(), 0.into(), 1.into(), 50.into(), 600.into()],
            "Resources" => resources.clone(),
        },
        body.encode().unwrap(),
    ));

    let mut page_resources = resources;
    page_resources.set("XObject", dictionary! { "Fm0" => form_id });
    builder.add_page(
        page_resources,
        vec![
            Operation::new("q", vec![]),
            Operation::new("cm", vec![1.into(), 0.into(), 0.into(), 1.into(), 0.into(), 0.into()]),
            Operation::new("Do", vec![Object::Name(b"Fm0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    );

    assert_eq!(
        tables_of(builder.finish()),
        vec![strings(&["No.", "Name"]), strings(&["1", "Ocean Star"])]
    );
}

#[test]
fn concurrent_table_exports_keep_their_own_scratch_files() {
    let scratch = TempDir::new().unwrap();
    let converter = TableSpreadsheetConverter::new(scratch.path());

    let vessels: Vec<Vec<Placed<'static>>> =
        vec![vec![(72, 700, "Vessel"), (200, 700, "Flag"), (72, 680, "Hai Feng"), (200, 680, "TW")]];
    let ports: Vec<Vec<Placed<'static>>> =
        vec![vec![(72, 700, "Port"), (200, 700, "Code"), (72, 680, "Kaohsiung"), (200, 680, "KHH")]];

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let (name, pages, first_cell) = if i % 2 == 0 {
                    ("vessels 20240601", &vessels, "Vessel")
                } else {
                    ("ports 20240601", &ports, "Port")
                };
                let converter = &converter;
                scope.spawn(move || {
                    let bytes = build_pdf(pages);
                    let rows = converter.table_rows(&bytes).unwrap();
                    let payload = converter.convert(raw_document(name, bytes)).unwrap();
                    (name, first_cell, rows, payload)
                })
            })
            .collect();

        for handle in handles {
            let (name, first_cell, rows, payload) = handle.join().unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0][0], first_cell);
            assert_eq!(
                payload.filename,
                format!("{}.xlsx", name.replace(' ', "_"))
            );
            assert!(payload.bytes.starts_with(b"PK"));
        }
    });

    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}
