use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::types::LanguageCode;

/// One invalid settings field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "translationFiles.filePattern")
    pub field_path: String,
    /// What is wrong and how to fix it.
    pub message: String,
}

impl ValidationError {
    /// Error for the field at `field_path`.
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

/// Failure to load or accept settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Every field that failed validation.
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    /// Settings file could not be read.
    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Settings file is not valid settings JSON.
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Numbered, one error per line.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Behaviour switches of one engine instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct EngineSettings {
    /// Preferred language when nothing else decides.
    pub initial_code: Option<LanguageCode>,

    /// On `change` to an unknown code, fall back to `initial_code` instead of
    /// keeping the current language.
    pub use_initial_code_when_unavailable: bool,

    /// Follow the device locale.
    pub sync_with_device: bool,

    /// Match the device locale by language subtag when no exact code exists
    /// (`en_GB` picks `en`).
    pub is_optional_country_code: bool,

    /// Persist the active code and restore it on the next start.
    pub auto_save: bool,

    /// Inherited refresh policy for subscribers that do not set their own.
    pub force_rebuild: bool,

    /// Forward absorbed anomalies to the diagnostic hook.
    pub is_debug: bool,

    /// Where directory discovery looks for translation files.
    pub translation_files: TranslationFilesConfig,

    /// Joins nested group names when flattening discovered files.
    pub key_separator: String,
}

/// Translation file discovery settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationFilesConfig {
    /// Glob relative to the project root.
    pub file_pattern: String,
}

impl EngineSettings {
    /// Collects every invalid field instead of stopping at the first.
    ///
    /// # Errors
    /// - Empty initial code
    /// - Empty key separator
    /// - Invalid glob pattern
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(code) = &self.initial_code
            && code.as_str().trim().is_empty()
        {
            errors.push(ValidationError::new(
                "initialCode",
                "The code cannot be empty. Please specify a language code (e.g., \"en\"), or remove this field",
            ));
        }

        if self.key_separator.is_empty() {
            errors.push(ValidationError::new(
                "keySeparator",
                "The separator cannot be empty. Please specify a separator, for example: \".\" (dot)",
            ));
        }

        if self.translation_files.file_pattern.is_empty() {
            errors.push(ValidationError::new(
                "translationFiles.filePattern",
                "The pattern cannot be empty. Example: \"**/{locales,languages}/**/*.json\"",
            ));
        } else if let Err(e) = globset::Glob::new(&self.translation_files.file_pattern) {
            errors.push(ValidationError::new(
                "translationFiles.filePattern",
                format!("Invalid glob pattern '{}': {e}", self.translation_files.file_pattern),
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for TranslationFilesConfig {
    fn default() -> Self {
        Self { file_pattern: "**/{locales,languages,i18n}/**/*.json".to_string() }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            initial_code: None,
            use_initial_code_when_unavailable: false,
            sync_with_device: true,
            is_optional_country_code: true,
            auto_save: true,
            force_rebuild: false,
            is_debug: false,
            translation_files: TranslationFilesConfig::default(),
            key_separator: ".".to_string(),
        }
    }
}
