//! Attestation overlay
//!
//! Draws the attestation values onto the pages of a template PDF. The
//! template's own content is left untouched: each page gets an extra content
//! stream and a Helvetica font resource under a name it does not already use.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use shared_pdf::{image_to_page, page_media_box};
use shared_types::attestation::CHECKED;
use shared_types::AttestationFields;

use crate::canvas::text_operations;
use crate::error::RenderError;
use crate::fonts::{font_dictionary, Font};
use crate::layout::{AttestationLayout, FieldKind};

const MAX_PARENT_DEPTH: usize = 32;

/// Render one attestation from the layout's template bytes
pub fn render_attestation(
    fields: &AttestationFields,
    layout: &AttestationLayout,
    template: &[u8],
) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::load_mem(template).map_err(|e| RenderError::Template {
        path: layout.template_pdf.clone(),
        message: e.to_string(),
    })?;

    let font_id = doc.add_object(font_dictionary(Font::Regular));
    let image_size = (layout.image_width, layout.image_height);
    let mut drawn = 0usize;

    for (page_number, page_id) in doc.get_pages() {
        let media_box = page_media_box(&doc, page_id);
        let entries: Vec<_> = layout
            .fields
            .iter()
            .filter(|entry| entry.page.map_or(true, |page| page == page_number))
            .filter_map(|entry| {
                let value = fields.get(&entry.field_id).unwrap_or_default();
                let text = match entry.kind {
                    FieldKind::Checkbox if !value.is_empty() => CHECKED,
                    _ => value,
                };
                (!text.is_empty()).then_some((entry, text))
            })
            .collect();

        if entries.is_empty() {
            continue;
        }

        let font_name = install_font(&mut doc, page_id, font_id)?;
        let mut operations = Vec::new();
        for (entry, text) in &entries {
            let (x, y) = image_to_page(&entry.bbox, image_size, media_box, entry.y_offset);
            operations.extend(text_operations(x, y, &font_name, entry.font_size, text));
        }
        append_content(&mut doc, page_id, operations)?;
        drawn += entries.len();
    }

    tracing::debug!(
        beneficiary = %fields.beneficiary_name,
        drawn,
        "Rendered attestation"
    );

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(buffer)
}

/// Register `font_id` in the page's font resources and return its name.
///
/// Inline and inherited resource dictionaries are moved into their own
/// objects first so every page sees a single place to write to.
fn install_font(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
) -> Result<String, RenderError> {
    let resources = doc.get_dictionary(page_id)?.get(b"Resources").ok().cloned();
    let resources_id = match resources {
        Some(Object::Reference(id)) => id,
        Some(Object::Dictionary(dict)) => {
            let id = doc.add_object(dict);
            doc.get_dictionary_mut(page_id)?
                .set("Resources", Object::Reference(id));
            id
        }
        _ => {
            let inherited = inherited_resources(doc, page_id).unwrap_or_default();
            let id = doc.add_object(inherited);
            doc.get_dictionary_mut(page_id)?
                .set("Resources", Object::Reference(id));
            id
        }
    };

    let fonts = doc.get_dictionary(resources_id)?.get(b"Font").ok().cloned();
    let fonts_id = match fonts {
        Some(Object::Reference(id)) => id,
        other => {
            let dict = match other {
                Some(Object::Dictionary(dict)) => dict,
                _ => Dictionary::new(),
            };
            let id = doc.add_object(dict);
            doc.get_dictionary_mut(resources_id)?
                .set("Font", Object::Reference(id));
            id
        }
    };

    let fonts = doc.get_dictionary_mut(fonts_id)?;
    let name = free_font_name(fonts, font_id);
    fonts.set(name.as_bytes().to_vec(), Object::Reference(font_id));
    Ok(name)
}

fn inherited_resources(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_PARENT_DEPTH {
        let parent_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        let parent = doc.get_dictionary(parent_id).ok()?;
        match parent.get(b"Resources") {
            Ok(Object::Reference(id)) => return doc.get_dictionary(*id).ok().cloned(),
            Ok(Object::Dictionary(dict)) => return Some(dict.clone()),
            _ => node = parent,
        }
    }
    None
}

/// First `FAttN` name that is unused or already points at `font_id`
fn free_font_name(fonts: &Dictionary, font_id: ObjectId) -> String {
    let mut index = 0usize;
    loop {
        let name = format!("FAtt{index}");
        match fonts.get(name.as_bytes()) {
            Err(_) => return name,
            Ok(Object::Reference(id)) if *id == font_id => return name,
            Ok(_) => index += 1,
        }
    }
}

/// Wrap the existing page content in q/Q and append the overlay stream
fn append_content(
    doc: &mut Document,
    page_id: ObjectId,
    operations: Vec<Operation>,
) -> Result<(), RenderError> {
    let existing = doc.get_dictionary(page_id)?.get(b"Contents").ok().cloned();
    let mut parts = match existing {
        Some(Object::Reference(id)) => match doc.get_object(id)? {
            Object::Array(items) => items.clone(),
            _ => vec![Object::Reference(id)],
        },
        Some(Object::Array(items)) => items,
        _ => Vec::new(),
    };

    let mut overlay = vec![Operation::new("Q", vec![])];
    overlay.extend(operations);
    let encoded = Content {
        operations: overlay,
    }
    .encode()?;

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), encoded));
    parts.insert(0, Object::Reference(save_id));
    parts.push(Object::Reference(overlay_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(parts));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutField;
    use shared_pdf::fixture::PdfFixture;
    use shared_pdf::BoundingBox;
    use std::path::PathBuf;

    fn fields() -> AttestationFields {
        AttestationFields {
            signatory_name: "Jean Dupont".to_string(),
            provider_name: "Formation Plus".to_string(),
            beneficiary_name: "Martin Durand".to_string(),
            company_name: String::new(),
            action_title: "Formation Python".to_string(),
            checkbox_action_training: CHECKED.to_string(),
            date_start: "01/01/2024".to_string(),
            date_end: "05/01/2024".to_string(),
            duration: "35".to_string(),
            location: "Paris".to_string(),
            signature_date: "05/01/2024".to_string(),
        }
    }

    fn entry(field_id: &str, kind: FieldKind, page: Option<u32>) -> LayoutField {
        LayoutField {
            field_id: field_id.to_string(),
            bbox: BoundingBox::new(100.0, 100.0, 400.0, 140.0),
            y_offset: 0.0,
            font_size: 12.0,
            kind,
            page,
        }
    }

    fn layout(fields: Vec<LayoutField>) -> AttestationLayout {
        AttestationLayout {
            template_pdf: PathBuf::from("template.pdf"),
            image_width: 1000.0,
            image_height: 1000.0,
            fields,
        }
    }

    fn page_content(bytes: &[u8], page: u32) -> Vec<u8> {
        let doc = Document::load_mem(bytes).unwrap();
        let page_id = doc.get_pages()[&page];
        doc.get_page_content(page_id).unwrap()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_draws_values_over_template() {
        let template = PdfFixture::new().line("ATTESTATION D'ASSIDUITE").build();
        let layout = layout(vec![
            entry("beneficiary_name", FieldKind::Text, None),
            entry("checkbox_action_training", FieldKind::Checkbox, None),
        ]);

        let bytes = render_attestation(&fields(), &layout, &template).unwrap();
        let content = page_content(&bytes, 1);
        assert!(contains(&content, b"(Martin Durand)"));
        assert!(contains(&content, b"(X)"));
        assert!(contains(&content, b"ATTESTATION"));

        let text = shared_pdf::extract_text(&bytes).unwrap();
        assert!(text.contains("Martin Durand"));
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let template = PdfFixture::new().line("Modele").build();
        let layout = layout(vec![
            entry("company_name", FieldKind::Text, None),
            entry("unknown_field", FieldKind::Checkbox, None),
        ]);

        let bytes = render_attestation(&fields(), &layout, &template).unwrap();
        let content = page_content(&bytes, 1);
        assert!(!contains(&content, b"FAtt0"));
    }

    #[test]
    fn test_page_filter() {
        let template = PdfFixture::new()
            .line("Page un")
            .page_break()
            .line("Page deux")
            .build();
        let layout = layout(vec![entry("location", FieldKind::Text, Some(2))]);

        let bytes = render_attestation(&fields(), &layout, &template).unwrap();
        assert!(!contains(&page_content(&bytes, 1), b"(Paris)"));
        assert!(contains(&page_content(&bytes, 2), b"(Paris)"));
    }

    #[test]
    fn test_position_follows_bbox() {
        let template = PdfFixture::new().line("Modele").build();
        let layout = layout(vec![entry("duration", FieldKind::Text, None)]);

        let bytes = render_attestation(&fields(), &layout, &template).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = doc.get_pages()[&1];
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let td = content
            .operations
            .iter()
            .rev()
            .find(|op| op.operator == "Td")
            .unwrap();
        let x = td.operands[0].as_float().unwrap();
        let y = td.operands[1].as_float().unwrap();
        assert!((x - 59.528).abs() < 0.01);
        assert!((y - (841.89 - 0.12 * 841.89)).abs() < 0.01);
    }

    #[test]
    fn test_inherited_resources_are_preserved() {
        let template = PdfFixture::new().line("Modele").build();
        let mut doc = Document::load_mem(&template).unwrap();
        let page_id = doc.get_pages()[&1];
        let resources = doc
            .get_dictionary_mut(page_id)
            .unwrap()
            .remove(b"Resources")
            .unwrap();
        let parent_id = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Parent")
            .unwrap()
            .as_reference()
            .unwrap();
        doc.get_dictionary_mut(parent_id)
            .unwrap()
            .set("Resources", resources);
        let mut moved = Vec::new();
        doc.save_to(&mut moved).unwrap();

        let layout = layout(vec![entry("location", FieldKind::Text, None)]);
        let bytes = render_attestation(&fields(), &layout, &moved).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = doc.get_pages()[&1];
        let resources_id = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Resources")
            .unwrap()
            .as_reference()
            .unwrap();
        let fonts_id = doc
            .get_dictionary(resources_id)
            .unwrap()
            .get(b"Font")
            .unwrap()
            .as_reference()
            .unwrap();
        let fonts = doc.get_dictionary(fonts_id).unwrap();
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(b"FAtt0"));
    }

    #[test]
    fn test_free_font_name_skips_taken_names() {
        let mut fonts = Dictionary::new();
        fonts.set("FAtt0", Object::Reference((90, 0)));
        assert_eq!(free_font_name(&fonts, (91, 0)), "FAtt1");
        assert_eq!(free_font_name(&fonts, (90, 0)), "FAtt0");
    }

    #[test]
    fn test_rejects_invalid_template() {
        let err = render_attestation(&fields(), &layout(vec![]), b"nope").unwrap_err();
        assert!(matches!(err, RenderError::Template { .. }));
    }
}
