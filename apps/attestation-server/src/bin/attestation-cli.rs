//! Attestation CLI
//!
//! Generates attestations from a convention PDF without going through HTTP.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use attestation_server::service::{render_attestations, write_attestations};
use attestation_server::Settings;
use clap::Parser;
use convention_engine::{extract_convention_data, validate_convention};
use document_render::ZipBundle;
use shared_pdf::read_document;
use tracing::{warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEBUG_PREVIEW_CHARS: usize = 800;

#[derive(Parser, Debug)]
#[command(name = "attestation-cli")]
#[command(about = "Generate attendance attestations from a training convention PDF")]
struct Args {
    /// Convention PDF to read
    pdf: PathBuf,

    /// Output path; one file per beneficiary is written next to it
    #[arg(short, long, default_value = "certificats_output/attestation.pdf")]
    output: PathBuf,

    /// Print the extracted text and form fields, then exit
    #[arg(long)]
    debug: bool,

    /// Directory holding convention_patterns.json and attestation_layout.json
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let pdf = fs::read(&args.pdf).with_context(|| format!("Cannot read {}", args.pdf.display()))?;

    if args.debug {
        return print_debug(&pdf);
    }

    let mut settings = Settings::from_env();
    if let Some(dir) = args.config_dir {
        settings = settings.with_config_dir(dir);
    }
    let patterns = settings.load_patterns()?;
    let layout = settings.load_layout()?;

    let extraction = extract_convention_data(&pdf, &patterns)?;
    if let Err(e) = validate_convention(&extraction) {
        warn!(error = %e, "Convention has inconsistent values, generating anyway");
    }

    let template = layout.read_template()?;
    let attestations = render_attestations(&extraction, &layout, &template)?;

    let dir = args.output.parent().unwrap_or_else(|| Path::new("."));
    let stem = args
        .output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("attestation");

    let names = write_attestations(dir, stem, &attestations)
        .with_context(|| format!("Cannot write attestations to {}", dir.display()))?;
    for name in &names {
        println!("Attestation generated: {}", dir.join(name).display());
    }

    if names.len() > 1 {
        let mut bundle = ZipBundle::new();
        for (name, attestation) in names.iter().zip(&attestations) {
            bundle.add(name, &attestation.bytes)?;
        }
        let archive = args.output.with_extension("zip");
        fs::write(&archive, bundle.finish()?)
            .with_context(|| format!("Cannot write {}", archive.display()))?;
        println!("Archive generated: {}", archive.display());
    }

    println!("{} attestation(s) generated.", names.len());
    Ok(())
}

fn print_debug(pdf: &[u8]) -> Result<()> {
    let content = read_document(pdf)?;

    println!("---- DEBUG TEXT (first {} chars) ----", DEBUG_PREVIEW_CHARS);
    let preview: String = content.text.chars().take(DEBUG_PREVIEW_CHARS).collect();
    if preview.trim().is_empty() {
        println!("[no text extracted]");
    } else {
        println!("{}", preview);
    }

    println!("---- FORM FIELDS ----");
    if content.form_fields.is_empty() {
        println!("[no form fields detected]");
    } else {
        for (name, value) in content.form_fields.sorted() {
            println!("{} = {}", name, value);
        }
    }
    Ok(())
}
