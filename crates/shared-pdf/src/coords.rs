//! Coordinate transformation from scanned-image pixels to PDF page points
//!
//! Layout descriptions are measured on a raster image of the template
//! (top-left origin, pixels). Pages use a bottom-left origin in points.

use lopdf::{Document, Object, ObjectId};
use serde::{Deserialize, Serialize};

/// A4 portrait, used when a page carries no readable MediaBox
pub const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 595.28, 841.89];

/// Bounding box in source-image pixels: `[left, top, right, bottom]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Vertical centre in image pixels
    pub fn center_y(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from([left, top, right, bottom]: [f64; 4]) -> Self {
        Self::new(left, top, right, bottom)
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.left, b.top, b.right, b.bottom]
    }
}

/// Map the text anchor of a bounding box to page coordinates.
///
/// X is the box's left edge. Y is the box's vertical centre shifted down by
/// `y_offset` pixels, with the axis flipped.
pub fn image_to_page(
    bbox: &BoundingBox,
    image_size: (f64, f64),
    media_box: [f64; 4],
    y_offset: f64,
) -> (f64, f64) {
    let (image_width, image_height) = image_size;
    let [mb_x, mb_y, mb_width, mb_height] = media_box;

    let x_pct = bbox.left / image_width;
    let y_pct = (bbox.center_y() + y_offset) / image_height;

    let pdf_x = mb_x + x_pct * mb_width;
    let pdf_y = mb_y + (mb_height - y_pct * mb_height);

    (pdf_x, pdf_y)
}

/// Page MediaBox as `[x, y, width, height]`, inherited from the parent when absent
pub fn page_media_box(doc: &Document, page_id: ObjectId) -> [f64; 4] {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return DEFAULT_MEDIA_BOX;
    };

    if let Some(rect) = page.get(b"MediaBox").ok().and_then(|o| parse_rect(doc, o)) {
        return rect;
    }

    let parent = page
        .get(b"Parent")
        .ok()
        .and_then(|p| p.as_reference().ok())
        .and_then(|id| doc.get_dictionary(id).ok());

    if let Some(rect) = parent
        .and_then(|p| p.get(b"MediaBox").ok())
        .and_then(|o| parse_rect(doc, o))
    {
        return rect;
    }

    DEFAULT_MEDIA_BOX
}

fn parse_rect(doc: &Document, obj: &Object) -> Option<[f64; 4]> {
    let arr = match obj {
        Object::Array(a) => a,
        Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok()?,
        _ => return None,
    };

    if arr.len() != 4 {
        return None;
    }

    let mut values = [0.0f64; 4];
    for (i, obj) in arr.iter().enumerate() {
        values[i] = number(doc, obj)?;
    }

    // [x1, y1, x2, y2] -> [x, y, width, height]
    Some([
        values[0],
        values[1],
        values[2] - values[0],
        values[3] - values[1],
    ])
}

fn number(doc: &Document, obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        Object::Reference(id) => match doc.get_object(*id).ok()? {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r as f64),
            _ => None,
        },
        _ => None,
    }
}
