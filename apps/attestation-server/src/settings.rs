//! Runtime settings
//!
//! Defaults are relative to the base directory and can be overridden by
//! environment variables (a `.env` file is honoured).

use std::path::PathBuf;

use convention_engine::{ConfigError, ConventionPatterns};
use document_render::{AttestationLayout, RenderError};

pub const DEFAULT_PROVIDER: &str = "Laurent-Serre-Developpement";
pub const DEFAULT_SIGNATORY: &str = "Laurent Serre";

const PATTERNS_FILE: &str = "convention_patterns.json";
const LAYOUT_FILE: &str = "attestation_layout.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_dir: PathBuf,
    pub config_dir: PathBuf,
    pub convention_patterns_file: PathBuf,
    pub attestation_layout_file: PathBuf,
    pub default_provider: String,
    pub default_signatory: String,
}

impl Settings {
    /// Defaults rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let config_dir = base_dir.join("config");
        Self {
            convention_patterns_file: config_dir.join(PATTERNS_FILE),
            attestation_layout_file: config_dir.join(LAYOUT_FILE),
            config_dir,
            base_dir,
            default_provider: DEFAULT_PROVIDER.to_string(),
            default_signatory: DEFAULT_SIGNATORY.to_string(),
        }
    }

    /// Load `.env` if present, then read the environment
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_dir = get("ATTESTATIONS_BASE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let mut settings = Self::new(base_dir);

        if let Some(dir) = get("ATTESTATIONS_CONFIG_DIR") {
            settings = settings.with_config_dir(dir);
        }
        if let Some(file) = get("CONVENTION_PATTERNS_FILE") {
            settings.convention_patterns_file = PathBuf::from(file);
        }
        if let Some(file) = get("ATTESTATION_LAYOUT_FILE") {
            settings.attestation_layout_file = PathBuf::from(file);
        }
        if let Some(provider) = get("DEFAULT_PROVIDER") {
            settings.default_provider = provider;
        }
        if let Some(signatory) = get("DEFAULT_SIGNATORY") {
            settings.default_signatory = signatory;
        }
        settings
    }

    /// Point both config files at `dir`
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self.convention_patterns_file = self.config_dir.join(PATTERNS_FILE);
        self.attestation_layout_file = self.config_dir.join(LAYOUT_FILE);
        self
    }

    pub fn load_patterns(&self) -> Result<ConventionPatterns, ConfigError> {
        ConventionPatterns::load(&self.convention_patterns_file)
    }

    /// Load the layout with its template resolved against the base directory
    pub fn load_layout(&self) -> Result<AttestationLayout, RenderError> {
        AttestationLayout::load(&self.attestation_layout_file, &self.base_dir)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(".")
    }
}
