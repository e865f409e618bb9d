//! Attestation layout description
//!
//! Positions are measured on a raster scan of the template, so the layout
//! carries the scan's pixel size next to each field's bounding box.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared_pdf::BoundingBox;

use crate::error::RenderError;

pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// How a field is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    /// Draws "X" when the value is non-empty
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutField {
    pub field_id: String,
    pub bbox: BoundingBox,
    /// Extra downward shift in image pixels
    #[serde(default)]
    pub y_offset: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default, rename = "type")]
    pub kind: FieldKind,
    /// 1-based page. Every page when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttestationLayout {
    pub template_pdf: PathBuf,
    pub image_width: f64,
    pub image_height: f64,
    pub fields: Vec<LayoutField>,
}

impl AttestationLayout {
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        let layout: AttestationLayout =
            serde_json::from_str(json).map_err(|e| RenderError::Layout(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Load a layout file. A relative template path is resolved against `base_dir`.
    pub fn load(path: impl AsRef<Path>, base_dir: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            RenderError::Layout(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut layout = Self::from_json(&json)?;
        if layout.template_pdf.is_relative() {
            layout.template_pdf = base_dir.as_ref().join(&layout.template_pdf);
        }
        tracing::debug!(
            path = %path.display(),
            template = %layout.template_pdf.display(),
            fields = layout.fields.len(),
            "Loaded attestation layout"
        );
        Ok(layout)
    }

    /// Read the template PDF named by this layout
    pub fn read_template(&self) -> Result<Vec<u8>, RenderError> {
        fs::read(&self.template_pdf).map_err(|e| RenderError::Template {
            path: self.template_pdf.clone(),
            message: e.to_string(),
        })
    }

    fn validate(&self) -> Result<(), RenderError> {
        if self.image_width <= 0.0 || self.image_height <= 0.0 {
            return Err(RenderError::Layout(format!(
                "image size must be positive, got {}x{}",
                self.image_width, self.image_height
            )));
        }
        if let Some(field) = self.fields.iter().find(|f| f.page == Some(0)) {
            return Err(RenderError::Layout(format!(
                "field {} uses page 0, pages start at 1",
                field.field_id
            )));
        }
        Ok(())
    }
}
