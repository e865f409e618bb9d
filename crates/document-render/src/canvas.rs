//! Minimal page-description writer for generated documents
//!
//! Drawing happens top-down: callers work with a vertical cursor measured
//! from the top margin and the canvas converts to PDF's bottom-left origin.
//! A new page starts automatically when a block does not fit.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use shared_pdf::encode_win_ansi;

use crate::error::RenderError;
use crate::fonts::{font_dictionary, text_width, Font};

/// A4 portrait in points
pub const A4: (f64, f64) = (595.28, 841.89);

/// One centimetre in points
pub const CM: f64 = 72.0 / 2.54;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// One table cell: text plus its font
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    pub text: &'a str,
    pub font: Font,
}

impl<'a> Cell<'a> {
    pub fn regular(text: &'a str) -> Self {
        Self {
            text,
            font: Font::Regular,
        }
    }

    pub fn bold(text: &'a str) -> Self {
        Self {
            text,
            font: Font::Bold,
        }
    }
}

/// Row styling for [`Canvas::table_row`]
#[derive(Debug, Clone, Copy)]
pub struct RowStyle {
    pub height: f64,
    pub font_size: f64,
    pub align: Align,
    /// Gray level of the cell background, `None` for no fill
    pub fill: Option<f64>,
    /// Grid line width, `None` for no borders
    pub grid: Option<f64>,
    /// Columns from this index on get the fill (0 fills the whole row)
    pub fill_from: usize,
}

impl Default for RowStyle {
    fn default() -> Self {
        Self {
            height: 0.8 * CM,
            font_size: 10.0,
            align: Align::Left,
            fill: None,
            grid: Some(0.5),
            fill_from: 0,
        }
    }
}

pub struct Canvas {
    width: f64,
    height: f64,
    margin: f64,
    cursor: f64,
    pages: Vec<Vec<Operation>>,
}

impl Canvas {
    /// A4 canvas with equal margins
    pub fn a4(margin: f64) -> Self {
        Self {
            width: A4.0,
            height: A4.1,
            margin,
            cursor: 0.0,
            pages: vec![Vec::new()],
        }
    }

    /// Usable width between the margins
    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    pub fn left(&self) -> f64 {
        self.margin
    }

    /// Distance already used below the top margin on the current page
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn available(&self) -> f64 {
        self.height - 2.0 * self.margin - self.cursor
    }

    /// Start a new page when `needed` points do not fit. Returns true on a break.
    pub fn ensure_space(&mut self, needed: f64) -> bool {
        if needed > self.available() && self.cursor > 0.0 {
            self.new_page();
            true
        } else {
            false
        }
    }

    pub fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor = 0.0;
    }

    pub fn space(&mut self, dy: f64) {
        self.cursor += dy;
    }

    fn baseline(&self, offset: f64) -> f64 {
        self.height - self.margin - self.cursor - offset
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Draw one line of text at absolute page coordinates
    pub fn text_at(&mut self, x: f64, y: f64, font: Font, size: f64, text: &str) {
        if text.is_empty() {
            return;
        }
        self.ops()
            .extend(text_operations(x, y, font.resource_name(), size, text));
    }

    /// Draw a line of text at the cursor and advance by `leading`
    pub fn line(&mut self, font: Font, size: f64, align: Align, text: &str, leading: f64) {
        self.ensure_space(leading);
        let x = match align {
            Align::Left => self.margin,
            Align::Center => (self.width - text_width(text, font, size)) / 2.0,
        };
        let y = self.baseline(size);
        self.text_at(x, y, font, size, text);
        self.cursor += leading;
    }

    /// Draw wrapped text at the cursor
    pub fn paragraph(&mut self, font: Font, size: f64, text: &str) {
        let leading = size * 1.25;
        for line in crate::fonts::wrap_text(text, font, size, self.content_width()) {
            self.line(font, size, Align::Left, &line, leading);
        }
    }

    /// Stroke an empty box spanning the content width
    pub fn boxed_area(&mut self, height: f64) {
        self.ensure_space(height);
        let x = self.margin;
        let y = self.baseline(height);
        let width = self.content_width();
        self.rect(x, y, width, height, None, Some(0.5));
        self.cursor += height;
    }

    /// Rectangle with optional gray fill and border
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Option<f64>, stroke: Option<f64>) {
        let rect = vec![real(x), real(y), real(w), real(h)];
        let ops = self.ops();
        if let Some(gray) = fill {
            ops.push(Operation::new("q", vec![]));
            ops.push(Operation::new("g", vec![real(gray)]));
            ops.push(Operation::new("re", rect.clone()));
            ops.push(Operation::new("f", vec![]));
            ops.push(Operation::new("Q", vec![]));
        }
        if let Some(width) = stroke {
            ops.push(Operation::new("q", vec![]));
            ops.push(Operation::new("w", vec![real(width)]));
            ops.push(Operation::new("re", rect));
            ops.push(Operation::new("S", vec![]));
            ops.push(Operation::new("Q", vec![]));
        }
    }

    /// Draw one table row at the cursor and advance past it.
    ///
    /// Cell text is vertically centred and clipped to a single line.
    pub fn table_row(&mut self, widths: &[f64], cells: &[Cell<'_>], style: RowStyle) {
        self.ensure_space(style.height);
        let top = self.baseline(0.0);
        let bottom = top - style.height;
        let mut x = self.margin;

        for (index, width) in widths.iter().enumerate() {
            if let Some(gray) = style.fill.filter(|_| index >= style.fill_from) {
                self.rect(x, bottom, *width, style.height, Some(gray), None);
            }
            if let Some(line_width) = style.grid {
                self.rect(x, bottom, *width, style.height, None, Some(line_width));
            }
            if let Some(cell) = cells.get(index) {
                let padding = 4.0;
                let text = fit_to_width(cell.text, cell.font, style.font_size, width - 2.0 * padding);
                let text_x = match style.align {
                    Align::Left => x + padding,
                    Align::Center => {
                        x + (width - text_width(&text, cell.font, style.font_size)) / 2.0
                    }
                };
                let text_y = bottom + (style.height - style.font_size * 0.7) / 2.0;
                self.text_at(text_x, text_y, cell.font, style.font_size, &text);
            }
            x += width;
        }

        self.cursor += style.height;
    }

    /// Serialise every page into a standalone document
    pub fn finish(self) -> Result<Vec<u8>, RenderError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let id = doc.add_object(font_dictionary(font));
            fonts.set(font.resource_name(), Object::Reference(id));
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => Object::Dictionary(fonts),
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations }
                .encode()
                .map_err(|e| RenderError::Pdf(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "Contents" => Object::Reference(content_id),
                "Resources" => Object::Reference(resources_id),
                "MediaBox" => vec![real(0.0), real(0.0), real(self.width), real(self.height)],
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        Ok(buffer)
    }
}

/// Operations drawing `text` with its baseline at (x, y) using font resource `font_name`
pub fn text_operations(x: f64, y: f64, font_name: &str, size: f64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(font_name.as_bytes().to_vec()), real(size)],
        ),
        Operation::new("Td", vec![real(x), real(y)]),
        Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

pub(crate) fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn fit_to_width(text: &str, font: Font, size: f64, max_width: f64) -> String {
    if text_width(text, font, size) <= max_width {
        return text.to_string();
    }
    let mut fitted = String::new();
    for c in text.chars() {
        fitted.push(c);
        if text_width(&format!("{fitted}…"), font, size) > max_width {
            fitted.pop();
            break;
        }
    }
    format!("{}…", fitted.trim_end())
}
