//! Convention PDF -> attestation(s)

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use convention_engine::{
    extract_convention_data, map_to_attestation_fields, validate_convention, ConventionExtraction,
    ConventionPatterns,
};
use document_render::{
    attestation_filename, render_attestation, sanitize_filename, unique_filename,
    AttestationLayout, RenderError, ZipBundle, DEFAULT_BENEFICIARY,
};
use shared_types::fields::BENEFICIARY_NAME;

use crate::error::ServerError;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const ZIP_MEDIA_TYPE: &str = "application/zip";
pub const ATTESTATIONS_ARCHIVE: &str = "attestations.zip";

/// A file ready to be sent back
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub media_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct RenderedAttestation {
    pub beneficiary: String,
    pub bytes: Vec<u8>,
}

/// Every participant, or the single resolved beneficiary
pub fn beneficiaries(extraction: &ConventionExtraction) -> Vec<String> {
    if !extraction.participants.is_empty() {
        return extraction.participants.clone();
    }
    vec![extraction
        .fields
        .get(BENEFICIARY_NAME)
        .cloned()
        .unwrap_or_else(|| DEFAULT_BENEFICIARY.to_string())]
}

/// One attestation per beneficiary, in order
pub fn render_attestations(
    extraction: &ConventionExtraction,
    layout: &AttestationLayout,
    template: &[u8],
) -> Result<Vec<RenderedAttestation>, RenderError> {
    beneficiaries(extraction)
        .into_iter()
        .map(|beneficiary| {
            let mut fields = extraction.fields.clone();
            fields.insert(BENEFICIARY_NAME.to_string(), beneficiary.clone());
            let bytes = render_attestation(&map_to_attestation_fields(&fields), layout, template)?;
            Ok(RenderedAttestation { beneficiary, bytes })
        })
        .collect()
}

/// Archive attestations under their file names
pub fn archive_attestations(attestations: &[RenderedAttestation]) -> Result<Vec<u8>, RenderError> {
    let mut bundle = ZipBundle::new();
    for attestation in attestations {
        bundle.add_unique(&attestation_filename(&attestation.beneficiary), &attestation.bytes)?;
    }
    bundle.finish()
}

/// Write each attestation into `dir` as `<stem>_<beneficiary>.pdf`, numbering
/// repeated names. Returns the file names in render order.
pub fn write_attestations(
    dir: &Path,
    stem: &str,
    attestations: &[RenderedAttestation],
) -> Result<Vec<String>, ServerError> {
    fs::create_dir_all(dir)?;
    let mut taken = BTreeSet::new();
    let mut names = Vec::with_capacity(attestations.len());
    for attestation in attestations {
        let name = unique_filename(
            &format!(
                "{}_{}.pdf",
                stem,
                sanitize_filename(&attestation.beneficiary, DEFAULT_BENEFICIARY)
            ),
            &taken,
        );
        fs::write(dir.join(&name), &attestation.bytes)?;
        taken.insert(name.clone());
        names.push(name);
    }
    Ok(names)
}

#[derive(Clone)]
pub struct AttestationService {
    patterns: Arc<ConventionPatterns>,
    layout: Arc<AttestationLayout>,
}

impl AttestationService {
    pub fn new(patterns: Arc<ConventionPatterns>, layout: Arc<AttestationLayout>) -> Self {
        Self { patterns, layout }
    }

    /// Extract, validate and render the attestations of an uploaded convention.
    ///
    /// A single beneficiary yields a PDF, several yield a ZIP archive.
    pub fn process_pdf(&self, pdf: &[u8]) -> Result<GeneratedDocument, ServerError> {
        self.process_pdf_in(pdf, &std::env::temp_dir())
    }

    /// Same as [`AttestationService::process_pdf`] with the request working
    /// directory created under `scratch_root`
    pub fn process_pdf_in(
        &self,
        pdf: &[u8],
        scratch_root: &Path,
    ) -> Result<GeneratedDocument, ServerError> {
        // Removed on drop, whatever the outcome
        let workdir = tempfile::tempdir_in(scratch_root)?;
        fs::write(workdir.path().join("convention.pdf"), pdf)?;

        let extraction = extract_convention_data(pdf, &self.patterns)?;
        validate_convention(&extraction)?;

        let template = self.layout.read_template()?;
        let attestations = render_attestations(&extraction, &self.layout, &template)?;
        tracing::info!(count = attestations.len(), "Attestations rendered");

        match attestations.as_slice() {
            [single] => Ok(GeneratedDocument {
                bytes: single.bytes.clone(),
                filename: attestation_filename(&single.beneficiary),
                media_type: PDF_MEDIA_TYPE,
            }),
            many => Ok(GeneratedDocument {
                bytes: archive_attestations(many)?,
                filename: ATTESTATIONS_ARCHIVE.to_string(),
                media_type: ZIP_MEDIA_TYPE,
            }),
        }
    }
}
