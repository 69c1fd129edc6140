//! In-memory PDF builders shared by the unit and integration tests.
#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// Text placed at (x, y) on a page.
pub type Placed<'a> = (i64, i64, &'a str);

/// A document under construction, one page at a time.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    pub fn add_object(&mut self, object: impl Into<Object>) -> ObjectId {
        self.doc.add_object(object)
    }

    /// Resources naming a WinAnsi Courier font `F1`.
    pub fn courier_resources(&mut self) -> Dictionary {
        let font_id = self.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        dictionary! { "Font" => dictionary! { "F1" => font_id } }
    }

    pub fn add_page(&mut self, resources: Dictionary, operations: Vec<Operation>) {
        let content = Content { operations };
        let content_id = self.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = self.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => resources,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        self.kids.push(page_id.into());
    }

    pub fn finish(mut self) -> Vec<u8> {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer).unwrap();
        buffer
    }
}

/// `BT /F1 10 Tf x y Td <text> Tj ET`
pub fn show_at(x: i64, y: i64, text: Object) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
        Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]),
        Operation::new("Tj", vec![text]),
        Operation::new("ET", vec![]),
    ]
}

pub fn courier_operations(placed: &[Placed<'_>]) -> Vec<Operation> {
    placed
        .iter()
        .flat_map(|(x, y, text)| show_at(*x, *y, Object::string_literal(*text)))
        .collect()
}

/// Build a PDF with one page per entry, each showing its strings in Courier.
pub fn build_pdf(pages: &[Vec<Placed<'_>>]) -> Vec<u8> {
    let mut builder = PdfBuilder::new();
    let resources = builder.courier_resources();
    for placed in pages {
        builder.add_page(resources.clone(), courier_operations(placed));
    }
    builder.finish()
}
