//! Translation targets: the configured set of languages a listing is translated into.
//!
//! Each target ties a language to the storage column that holds its translation.
//! The set is loaded once at startup and shared read-only afterwards.

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Column holding the untranslated source text. Never a translation target.
pub const SOURCE_FIELD: &str = "description";

/// One language the engine must produce a translation for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationTarget {
    /// English name of the language, used by the primary provider's prompt (e.g. "French")
    pub language_name: String,

    /// ISO 639-1 code, used by the secondary provider's language pair (e.g. "fr")
    pub language_code: String,

    /// Listing column that receives the translation (e.g. "description_fr")
    pub storage_field: String,
}

impl TranslationTarget {
    pub fn new(language_name: &str, language_code: &str, storage_field: &str) -> Self {
        Self {
            language_name: language_name.to_string(),
            language_code: language_code.to_string(),
            storage_field: storage_field.to_string(),
        }
    }
}

static FIELD_REGEX: OnceLock<Regex> = OnceLock::new();

fn field_regex() -> &'static Regex {
    FIELD_REGEX.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid field regex"))
}

/// Ordered, validated collection of translation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSet {
    targets: Vec<TranslationTarget>,
}

impl TargetSet {
    /// Build a target set, rejecting duplicates and unsafe column names.
    pub fn new(targets: Vec<TranslationTarget>) -> Result<Self> {
        if targets.is_empty() {
            bail!("At least one translation target must be configured");
        }

        for (i, target) in targets.iter().enumerate() {
            if target.language_name.trim().is_empty() || target.language_code.trim().is_empty() {
                bail!("Translation target #{} has an empty language name or code", i + 1);
            }
            if !field_regex().is_match(&target.storage_field) {
                bail!(
                    "Invalid storage field '{}' for {}: expected a lowercase SQL identifier",
                    target.storage_field,
                    target.language_name
                );
            }
            if target.storage_field == SOURCE_FIELD {
                bail!("Storage field '{}' is reserved for the source text", SOURCE_FIELD);
            }

            for other in &targets[..i] {
                if other.language_name.eq_ignore_ascii_case(&target.language_name) {
                    bail!("Duplicate language name: '{}'", target.language_name);
                }
                if other.storage_field == target.storage_field {
                    bail!("Duplicate storage field: '{}'", target.storage_field);
                }
            }
        }

        Ok(Self { targets })
    }

    /// Parse a target list of the form `Name:code:field,Name:code:field`.
    pub fn parse(spec: &str) -> Result<Self> {
        let targets = spec
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
                match parts.as_slice() {
                    [name, code, field] => Ok(TranslationTarget::new(name, code, field)),
                    _ => bail!(
                        "Invalid translation target '{}'. Expected Name:code:field",
                        entry
                    ),
                }
            })
            .collect::<Result<Vec<_>>>()
            .context("Failed to parse TRANSLATION_TARGETS")?;

        Self::new(targets)
    }

    /// The languages the listing site has always shipped with.
    pub fn defaults() -> Self {
        Self {
            targets: vec![
                TranslationTarget::new("French", "fr", "description_fr"),
                TranslationTarget::new("Spanish", "es", "description_es"),
                TranslationTarget::new("German", "de", "description_de"),
                TranslationTarget::new("Japanese", "ja", "description_jp"),
                TranslationTarget::new("Thai", "th", "description_th"),
            ],
        }
    }

    pub fn as_slice(&self) -> &[TranslationTarget] {
        &self.targets
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranslationTarget> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Find a target by language name or code, ignoring case.
    pub fn find(&self, lang: &str) -> Option<&TranslationTarget> {
        let lang = lang.trim();
        self.targets.iter().find(|t| {
            t.language_name.eq_ignore_ascii_case(lang) || t.language_code.eq_ignore_ascii_case(lang)
        })
    }

    /// Storage columns in configured order.
    pub fn storage_fields(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.storage_field.as_str()).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.targets.iter().any(|t| t.storage_field == field)
    }

    /// Lowercased language names, for error messages.
    pub fn language_names(&self) -> Vec<String> {
        self.targets
            .iter()
            .map(|t| t.language_name.to_lowercase())
            .collect()
    }
}

/// Which targets a translation run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSelection {
    All,
    Single(String),
}

impl LanguageSelection {
    /// A missing language or the literal "all" selects every target.
    pub fn from_param(lang: Option<&str>) -> Self {
        match lang.map(str::trim) {
            None | Some("") => LanguageSelection::All,
            Some(l) if l.eq_ignore_ascii_case("all") => LanguageSelection::All,
            Some(l) => LanguageSelection::Single(l.to_string()),
        }
    }
}
