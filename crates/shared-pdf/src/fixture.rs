//! In-memory PDF builder for tests
//!
//! Produces small documents with a Helvetica text layer and optional AcroForm
//! fields so extraction can be tested without binary fixtures on disk.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::encoding::encode_win_ansi;

const FONT_SIZE: i64 = 11;
const LEADING: i64 = 14;

/// Build a terminal text field dictionary
pub fn form_field(name: Option<&str>, value: Option<Object>) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("FT", Object::Name(b"Tx".to_vec()));
    if let Some(name) = name {
        dict.set(
            "T",
            Object::String(name.as_bytes().to_vec(), StringFormat::Literal),
        );
    }
    if let Some(value) = value {
        dict.set("V", value);
    }
    dict
}

pub struct PdfFixture {
    doc: Document,
    pages: Vec<Vec<String>>,
    field_ids: Vec<ObjectId>,
}

impl Default for PdfFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfFixture {
    pub fn new() -> Self {
        Self {
            doc: Document::with_version("1.5"),
            pages: vec![Vec::new()],
            field_ids: Vec::new(),
        }
    }

    /// Append a line of text to the current page
    pub fn line(mut self, text: &str) -> Self {
        if let Some(page) = self.pages.last_mut() {
            page.push(text.to_string());
        }
        self
    }

    /// Append every line of a block of text
    pub fn text(mut self, text: &str) -> Self {
        for line in text.lines() {
            self = self.line(line);
        }
        self
    }

    pub fn page_break(mut self) -> Self {
        self.pages.push(Vec::new());
        self
    }

    /// Add a filled text field
    pub fn field(mut self, name: &str, value: &str) -> Self {
        let value = Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
        let id = self.doc.add_object(form_field(Some(name), Some(value)));
        self.field_ids.push(id);
        self
    }

    /// Use a document that already holds field objects as the base.
    /// Replaces anything added with [`PdfFixture::field`].
    pub fn raw_fields(mut self, doc: Document, field_ids: Vec<ObjectId>) -> Self {
        self.doc = doc;
        self.field_ids = field_ids;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let PdfFixture {
            mut doc,
            pages,
            field_ids,
        } = self;

        let pages_id = doc.new_object_id();

        let mut font = Dictionary::new();
        font.set("Type", Object::Name(b"Font".to_vec()));
        font.set("Subtype", Object::Name(b"Type1".to_vec()));
        font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
        font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        let font_id = doc.add_object(font);

        let mut fonts = Dictionary::new();
        fonts.set("F1", Object::Reference(font_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));
        let resources_id = doc.add_object(resources);

        let mut kids = Vec::new();
        for lines in &pages {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
                Operation::new("Td", vec![50i64.into(), 780i64.into()]),
            ];
            for (i, line) in lines.iter().enumerate() {
                if i > 0 {
                    operations.push(Operation::new("Td", vec![0i64.into(), (-LEADING).into()]));
                }
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
                ));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations };
            let encoded = content.encode().unwrap_or_default();
            let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

            let mut page = Dictionary::new();
            page.set("Type", Object::Name(b"Page".to_vec()));
            page.set("Parent", Object::Reference(pages_id));
            page.set("Contents", Object::Reference(content_id));
            page.set("Resources", Object::Reference(resources_id));
            page.set(
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(595.28),
                    Object::Real(841.89),
                ]),
            );
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", Object::Integer(kids.len() as i64));
        pages_dict.set("Kids", Object::Array(kids));
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        if !field_ids.is_empty() {
            let mut acroform = Dictionary::new();
            acroform.set(
                "Fields",
                Object::Array(field_ids.into_iter().map(Object::Reference).collect()),
            );
            catalog.set("AcroForm", Object::Dictionary(acroform));
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }
}
