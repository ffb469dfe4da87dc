//! Translation files on disk.
//!
//! [`AssetSource`] reads either the static layout written by
//! [`crate::export`] or, in discovery mode, any tree of per-language JSON
//! files (`locales/en.json`, `i18n/vi/common.json`, ...).

use std::path::{
    Path,
    PathBuf,
};

use async_trait::async_trait;
use globset::{
    Glob,
    GlobSetBuilder,
};
use ignore::WalkBuilder;
use serde_json::Value;
use tokio::sync::OnceCell;

use super::source::{
    DataSource,
    SourceError,
};
use super::{
    MANIFEST_FILE,
    data_file_path,
};
use crate::directory::is_language_tag;
use crate::types::LanguageCode;
use crate::value::{
    TranslationMap,
    TranslationValue,
};

/// Detect language from file path heuristically
///
/// Splits the path by '/' and '.', then searches backwards for a part
/// that is a well-formed language tag.
///
/// # Examples
/// - `locales/en.json` → `en`
/// - `messages/ja-JP.json` → `ja-JP`
/// - `translations/en_US/common.json` → `en_US`
pub(crate) fn detect_language_from_path(file_path: &Path) -> Option<LanguageCode> {
    let path_str = file_path.to_string_lossy();
    path_str
        .split(['/', '\\', '.'])
        .rev()
        .find(|part| is_language_tag(part))
        .map(LanguageCode::from)
}

/// Flatten nested JSON groups into separator-joined keys.
///
/// Objects shaped like a condition set (`param` + `conditions`) are leaves and
/// stay intact, as do strings and other scalars.
///
/// # Errors
/// Returns a message when a leaf is not a valid translation value.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use i18n_runtime::input::translation::flatten_json;
/// use i18n_runtime::value::TranslationValue;
///
/// let json = json!({
///     "common": {
///         "hello": "Hello",
///         "goodbye": "Goodbye"
///     }
/// });
///
/// let flattened = flatten_json(&json, ".").unwrap();
/// assert_eq!(flattened.get("common.hello"), Some(&TranslationValue::from("Hello")));
/// assert_eq!(flattened.get("common.goodbye"), Some(&TranslationValue::from("Goodbye")));
/// ```
pub fn flatten_json(json: &Value, separator: &str) -> Result<TranslationMap, String> {
    let mut result = TranslationMap::new();
    flatten_json_value(json, separator, None, &mut result)?;
    Ok(result)
}

/// Object with both condition-set fields.
fn is_condition_object(json: &Value) -> bool {
    json.as_object().is_some_and(|map| map.contains_key("param") && map.contains_key("conditions"))
}

/// Recursive step of [`flatten_json`]; `prefix` is the key built so far.
fn flatten_json_value(
    json: &Value,
    separator: &str,
    prefix: Option<&str>,
    result: &mut TranslationMap,
) -> Result<(), String> {
    match json {
        Value::Object(map) if !is_condition_object(json) => {
            for (key, value) in map {
                let full_key =
                    prefix.map_or_else(|| key.clone(), |p| format!("{p}{separator}{key}"));
                flatten_json_value(value, separator, Some(&full_key), result)?;
            }
        }
        _ => {
            if let Some(key) = prefix {
                result.insert(key.to_string(), TranslationValue::try_from(json.clone())?);
            }
        }
    }
    Ok(())
}

/// Find files under `root` matching `pattern`, honoring `.gitignore`.
fn find_translation_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, SourceError> {
    let glob = Glob::new(pattern)
        .map_err(|e| SourceError::Discovery(format!("Invalid pattern '{pattern}': {e}")))?;
    let matcher = GlobSetBuilder::new()
        .add(glob)
        .build()
        .map_err(|e| SourceError::Discovery(format!("Failed to build pattern: {e}")))?;

    let mut found_files = Vec::new();
    for result in WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_exclude(true)
        .follow_links(false)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let Ok(relative_path) = path.strip_prefix(root) else {
            continue;
        };
        if matcher.is_match(relative_path) {
            found_files.push(path.to_path_buf());
        }
    }

    found_files.sort();
    Ok(found_files)
}

/// How an [`AssetSource`] finds its files.
#[derive(Debug, Clone)]
enum Layout {
    /// `codes.json` + `data/<code>.json`.
    Manifest,
    /// Files matching a glob, language detected from the path.
    Discovered {
        /// Glob relative to the root.
        pattern: String,
        /// Joins nested group names.
        key_separator: String,
    },
}

/// Translation data bundled on the local filesystem.
#[derive(Debug)]
pub struct AssetSource {
    /// Identifier for removal and logs.
    name: String,
    /// Layout root or discovery root.
    root: PathBuf,
    /// Manifest or discovery mode.
    layout: Layout,
    /// Merge policy flag.
    overrides: bool,
    /// Discovered files with their detected code, walked once.
    discovered: OnceCell<Vec<(LanguageCode, PathBuf)>>,
}

impl AssetSource {
    /// Reads the static layout rooted at `root`.
    #[must_use]
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            layout: Layout::Manifest,
            overrides: false,
            discovered: OnceCell::new(),
        }
    }

    /// Discovers per-language files under `root` matching `pattern`.
    ///
    /// Several files for one language are merged in path order; nested groups
    /// become `key_separator`-joined keys.
    #[must_use]
    pub fn discover(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        pattern: impl Into<String>,
        key_separator: impl Into<String>,
    ) -> Self {
        Self {
            layout: Layout::Discovered {
                pattern: pattern.into(),
                key_separator: key_separator.into(),
            },
            ..Self::new(name, root)
        }
    }

    /// Lets this source replace entries of earlier sources.
    #[must_use]
    pub const fn with_override(mut self, overrides: bool) -> Self {
        self.overrides = overrides;
        self
    }

    /// Walks the root on first use; a failed walk is retried next time.
    async fn discovered_files(&self, pattern: &str) -> Result<&[(LanguageCode, PathBuf)], SourceError> {
        let files = self
            .discovered
            .get_or_try_init(|| async {
                let files = find_translation_files(&self.root, pattern)?;
                let detected: Vec<_> = files
                    .into_iter()
                    .filter_map(|path| {
                        let relative = path.strip_prefix(&self.root).unwrap_or(path.as_path());
                        let Some(code) = detect_language_from_path(relative) else {
                            tracing::debug!(path = %path.display(), "No language code in path");
                            return None;
                        };
                        Some((code, path))
                    })
                    .collect();
                tracing::debug!(
                    root = %self.root.display(),
                    count = detected.len(),
                    "Discovered translation files"
                );
                Ok::<_, SourceError>(detected)
            })
            .await?;
        Ok(files.as_slice())
    }

    /// Reads and parses one JSON file.
    async fn read_json(path: &Path) -> Result<Value, SourceError> {
        let content = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl DataSource for AssetSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn overrides(&self) -> bool {
        self.overrides
    }

    async fn supported_codes(&self) -> Result<Vec<LanguageCode>, SourceError> {
        match &self.layout {
            Layout::Manifest => {
                let manifest = Self::read_json(&self.root.join(MANIFEST_FILE)).await?;
                Ok(serde_json::from_value(manifest)?)
            }
            Layout::Discovered { pattern, .. } => {
                let mut codes: Vec<LanguageCode> = Vec::new();
                for (code, _) in self.discovered_files(pattern).await? {
                    if !codes.contains(code) {
                        codes.push(code.clone());
                    }
                }
                Ok(codes)
            }
        }
    }

    async fn data(&self, code: &LanguageCode) -> Result<TranslationMap, SourceError> {
        match &self.layout {
            Layout::Manifest => {
                let path = self.root.join(data_file_path(code));
                let json = Self::read_json(&path).await?;
                Ok(serde_json::from_value(json)?)
            }
            Layout::Discovered { pattern, key_separator } => {
                let mut data = TranslationMap::new();
                for (file_code, path) in self.discovered_files(pattern).await? {
                    if file_code != code {
                        continue;
                    }
                    let json = Self::read_json(path).await?;
                    let flattened = flatten_json(&json, key_separator).map_err(|message| {
                        SourceError::Invalid { location: path.display().to_string(), message }
                    })?;
                    data.extend(flattened);
                }
                Ok(data)
            }
        }
    }
}
