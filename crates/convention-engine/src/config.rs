//! Declarative extraction rules
//!
//! The JSON shape is:
//!
//! ```json
//! {
//!   "required": ["provider_name", "date_start"],
//!   "fields": {
//!     "provider_name": {
//!       "patterns": ["Entre\\s+(?P<value>.+?)\\s+Ci-après"],
//!       "labels": ["Prestataire :"]
//!     }
//!   }
//! }
//! ```
//!
//! [`PatternConfig`] is the raw document. It is compiled once into
//! [`ConventionPatterns`], which holds the built regexes and is shared
//! read-only between requests.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Raw pattern configuration as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternConfig {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldRules>,
}

/// Patterns and labels for one field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRules {
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// A field's compiled rules
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub id: String,
    /// Case-insensitive, multi-line
    pub patterns: Vec<Regex>,
    pub labels: Vec<String>,
}

/// Compiled, immutable pattern configuration
#[derive(Debug, Clone, Default)]
pub struct ConventionPatterns {
    fields: Vec<FieldSpec>,
    required: Vec<String>,
}

impl ConventionPatterns {
    pub fn compile(config: PatternConfig) -> Result<Self, ConfigError> {
        let mut fields = Vec::with_capacity(config.fields.len());

        for (id, rules) in config.fields {
            let patterns = rules
                .patterns
                .iter()
                .map(|pattern| {
                    RegexBuilder::new(pattern)
                        .case_insensitive(true)
                        .multi_line(true)
                        .build()
                        .map_err(|source| ConfigError::InvalidPattern {
                            field: id.clone(),
                            pattern: pattern.clone(),
                            source,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            fields.push(FieldSpec {
                id,
                patterns,
                labels: rules.labels,
            });
        }

        for required in &config.required {
            if !fields.iter().any(|f| &f.id == required) {
                tracing::warn!(
                    field = %required,
                    "Required field has no extraction rules and can only be filled by the fallback pass"
                );
            }
        }

        Ok(Self {
            fields,
            required: config.required,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PatternConfig = serde_json::from_str(json)?;
        Self::compile(config)
    }

    /// Load and compile a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let patterns = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            fields = patterns.fields.len(),
            required = patterns.required.len(),
            "Loaded convention patterns"
        );
        Ok(patterns)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Required field identifiers, in configuration order
    pub fn required(&self) -> &[String] {
        &self.required
    }
}
