//! PDF decoding: plain text and positioned text for table detection.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{
    Dictionary, Document, Encoding, Object, ObjectId, Stream,
    content::{Content, Operation},
};
use tracing::{debug, warn};

use crate::converter::errors::ConvertError;
use crate::converter::layout::{Table, TextFragment, detect_tables};

/// `TJ` adjustments (thousandths of an em) wider than this read as a space.
const TJ_SPACE_THRESHOLD: f32 = 250.0;

/// Tables detected on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageTables {
    pub page: u32,
    pub tables: Vec<Table>,
}

/// Extract the document's text in reading order.
pub fn extract_text(bytes: &[u8]) -> Result<String, ConvertError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ConvertError::Decode(e.to_string()))
}

/// Detect tables on every page of the PDF at `path`, in page order.
///
/// Pages whose content cannot be decoded are skipped with a warning.
pub fn extract_tables(path: &Path) -> Result<Vec<PageTables>, ConvertError> {
    let document = Document::load(path).map_err(|e| ConvertError::Decode(e.to_string()))?;

    let mut pages = Vec::new();
    // get_pages is a BTreeMap keyed by page number, so this is page order
    for (page, page_id) in document.get_pages() {
        match page_fragments(&document, page_id) {
            Ok(fragments) => {
                let tables = detect_tables(fragments);
                debug!("Page {}: {} table(s)", page, tables.len());
                pages.push(PageTables { page, tables });
            }
            Err(e) => warn!("Skipping page {}: {}", page, e),
        }
    }

    Ok(pages)
}

fn page_fragments(document: &Document, page_id: ObjectId) -> Result<Vec<TextFragment>, ConvertError> {
    let data = document
        .get_page_content(page_id)
        .map_err(|e| ConvertError::Decode(e.to_string()))?;
    let content = Content::decode(&data).map_err(|e| ConvertError::Decode(e.to_string()))?;
    let resources = Resources::for_page(document, page_id);
    Ok(TextCursor::collect(&content.operations, &resources))
}

/// Nesting limit for Form XObjects drawing other forms.
const MAX_FORM_DEPTH: usize = 8;

/// What a content stream can refer to by name: fonts and XObjects.
#[derive(Default)]
struct Resources<'a> {
    document: Option<&'a Document>,
    fonts: BTreeMap<Vec<u8>, Encoding<'a>>,
    xobjects: Vec<&'a Dictionary>,
}

impl<'a> Resources<'a> {
    fn for_page(document: &'a Document, page_id: ObjectId) -> Self {
        let fonts = match document.get_page_fonts(page_id) {
            Ok(fonts) => fonts
                .into_iter()
                .filter_map(|(name, font)| Some((name, font_encoding(document, font)?)))
                .collect(),
            Err(e) => {
                warn!("Could not read fonts of page {:?}: {}", page_id, e);
                BTreeMap::new()
            }
        };

        let mut xobjects = Vec::new();
        if let Ok((inline, ids)) = document.get_page_resources(page_id) {
            let dicts = inline
                .into_iter()
                .chain(ids.into_iter().filter_map(|id| document.get_dictionary(id).ok()));
            xobjects.extend(dicts.filter_map(|dict| dict_entry(document, dict, b"XObject")));
        }

        Self {
            document: Some(document),
            fonts,
            xobjects,
        }
    }

    /// Resources declared by a form's own `/Resources` dictionary.
    fn for_form(document: &'a Document, resources: &'a Dictionary) -> Self {
        let fonts = dict_entry(document, resources, b"Font")
            .map(|fonts| {
                fonts
                    .iter()
                    .filter_map(|(name, font)| {
                        let font = document.dereference(font).ok()?.1.as_dict().ok()?;
                        Some((name.clone(), font_encoding(document, font)?))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            document: Some(document),
            fonts,
            xobjects: dict_entry(document, resources, b"XObject").into_iter().collect(),
        }
    }

    fn form(&self, name: &[u8]) -> Option<&'a Stream> {
        let document = self.document?;
        let stream = self
            .xobjects
            .iter()
            .copied()
            .find_map(|xobjects| xobjects.get(name).ok())
            .and_then(|object| document.dereference(object).ok())
            .and_then(|(_, object)| object.as_stream().ok())?;
        let subtype = stream.dict.get(b"Subtype").and_then(Object::as_name).ok();
        (subtype == Some(b"Form".as_slice())).then_some(stream)
    }
}

fn font_encoding<'a>(document: &'a Document, font: &'a Dictionary) -> Option<Encoding<'a>> {
    if !font.type_is(b"Font") {
        return None;
    }
    font.get_font_encoding(document)
        .map_err(|e| debug!("Unusable font encoding: {}", e))
        .ok()
}

/// `dict[key]` as a dictionary, following references.
fn dict_entry<'a>(document: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    let object = dict.get(key).ok()?;
    document.dereference(object).ok()?.1.as_dict().ok()
}

type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

fn translation(tx: f32, ty: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

/// The parts of the graphics state that `q`/`Q` save and restore.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font: Option<Vec<u8>>,
}

/// Tracks just enough graphics and text state to place each shown string.
///
/// Glyph advances are not computed, so a string shown right after another
/// without repositioning is appended to the previous fragment.
struct TextCursor {
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    leading: f32,
    continues_fragment: bool,
    fragments: Vec<TextFragment>,
}

impl Default for TextCursor {
    fn default() -> Self {
        Self {
            state: GraphicsState {
                ctm: IDENTITY,
                font: None,
            },
            saved: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            leading: 0.0,
            continues_fragment: false,
            fragments: Vec::new(),
        }
    }
}

impl TextCursor {
    /// Positioned text shown by `operations`, including text drawn by forms.
    fn collect(operations: &[Operation], resources: &Resources<'_>) -> Vec<TextFragment> {
        let mut cursor = Self::default();
        cursor.run(operations, resources, 0);

        cursor
            .fragments
            .into_iter()
            .map(|f| TextFragment::new(f.x, f.y, f.text.trim()))
            .filter(|f| !f.text.is_empty())
            .collect()
    }

    fn run(&mut self, operations: &[Operation], resources: &Resources<'_>, depth: usize) {
        for op in operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => self.saved.push(self.state.clone()),
                "Q" => {
                    if let Some(state) = self.saved.pop() {
                        self.state = state;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix(operands) {
                        self.state.ctm = multiply(&m, &self.state.ctm);
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.draw_form(name, resources, depth);
                    }
                }
                "BT" => {
                    self.text_matrix = IDENTITY;
                    self.line_matrix = IDENTITY;
                    self.continues_fragment = false;
                }
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.state.font = Some(name.clone());
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(number) {
                        self.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if let (Some(tx), Some(ty)) = (
                        operands.first().and_then(number),
                        operands.get(1).and_then(number),
                    ) {
                        if op.operator == "TD" {
                            self.leading = -ty;
                        }
                        self.next_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix(operands) {
                        self.text_matrix = m;
                        self.line_matrix = m;
                        self.continues_fragment = false;
                    }
                }
                "T*" => self.next_line(0.0, -self.leading),
                "Tj" => {
                    if let Some(text) = operands.first().and_then(|o| self.string(o, resources)) {
                        self.show(&text);
                    }
                }
                "'" => {
                    self.next_line(0.0, -self.leading);
                    if let Some(text) = operands.first().and_then(|o| self.string(o, resources)) {
                        self.show(&text);
                    }
                }
                "\"" => {
                    self.next_line(0.0, -self.leading);
                    if let Some(text) = operands.get(2).and_then(|o| self.string(o, resources)) {
                        self.show(&text);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let text = self.array_text(items, resources);
                        self.show(&text);
                    }
                }
                _ => {}
            }
        }
    }

    /// Run a Form XObject's content under `form matrix x ctm`, then restore
    /// the graphics state.
    fn draw_form(&mut self, name: &[u8], resources: &Resources<'_>, depth: usize) {
        if depth >= MAX_FORM_DEPTH {
            warn!("Form XObjects nested deeper than {}, skipping", MAX_FORM_DEPTH);
            return;
        }
        let (Some(document), Some(form)) = (resources.document, resources.form(name)) else {
            return;
        };
        let operations = match form
            .get_plain_content()
            .and_then(|data| Content::decode(&data))
        {
            Ok(content) => content.operations,
            Err(e) => {
                warn!("Skipping form {}: {}", String::from_utf8_lossy(name), e);
                return;
            }
        };

        let saved = self.state.clone();
        let form_matrix = form
            .dict
            .get(b"Matrix")
            .and_then(Object::as_array)
            .ok()
            .and_then(|m| matrix(m.as_slice()))
            .unwrap_or(IDENTITY);
        self.state.ctm = multiply(&form_matrix, &self.state.ctm);

        match dict_entry(document, &form.dict, b"Resources") {
            Some(own) => self.run(&operations, &Resources::for_form(document, own), depth + 1),
            None => self.run(&operations, resources, depth + 1),
        }

        self.state = saved;
        self.continues_fragment = false;
    }

    fn next_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply(&translation(tx, ty), &self.line_matrix);
        self.text_matrix = self.line_matrix;
        self.continues_fragment = false;
    }

    fn show(&mut self, text: &str) {
        if self.continues_fragment
            && let Some(last) = self.fragments.last_mut()
        {
            last.text.push_str(text);
            return;
        }
        if text.trim().is_empty() {
            return;
        }

        let placed = multiply(&self.text_matrix, &self.state.ctm);
        self.fragments
            .push(TextFragment::new(placed[4], placed[5], text));
        self.continues_fragment = true;
    }

    /// Decode a string operand with the current font's encoding, falling back
    /// to [`decode_pdf_string`] when the font is unknown or cannot decode it.
    fn string(&self, object: &Object, resources: &Resources<'_>) -> Option<String> {
        let Object::String(bytes, _) = object else {
            return None;
        };
        if bytes.starts_with(&[0xFE, 0xFF]) {
            return Some(decode_pdf_string(bytes));
        }

        let decoded = self
            .state
            .font
            .as_ref()
            .and_then(|name| resources.fonts.get(name))
            .and_then(|encoding| Document::decode_text(encoding, bytes).ok());
        Some(decoded.unwrap_or_else(|| decode_pdf_string(bytes)))
    }

    fn array_text(&self, items: &[Object], resources: &Resources<'_>) -> String {
        let mut text = String::new();
        for item in items {
            if let Some(part) = self.string(item, resources) {
                text.push_str(&part);
            } else if number(item).is_some_and(|adjust| adjust < -TJ_SPACE_THRESHOLD) {
                text.push(' ');
            }
        }
        text
    }
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn matrix(operands: &[Object]) -> Option<Matrix> {
    if operands.len() != 6 {
        return None;
    }
    let mut m = IDENTITY;
    for (slot, operand) in m.iter_mut().zip(operands) {
        *slot = number(operand)?;
    }
    Some(m)
}

/// Decode a string shown without a usable font: UTF-16BE when it carries a
/// BOM, otherwise the single-byte encoding simple fonts use.
fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => encoding_rs::UTF_16BE
            .decode_without_bom_handling(utf16)
            .0
            .into_owned(),
        None => encoding_rs::WINDOWS_1252
            .decode_without_bom_handling(bytes)
            .0
            .into_owned(),
    }
}
