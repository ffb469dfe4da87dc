//! Data source definitions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use crate::types::LanguageCode;
use crate::value::{
    TranslationMap,
    TranslationTable,
};

/// Errors raised while fetching source data.
///
/// These never reach translation callers: the merge step logs them and
/// treats the source as contributing nothing.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Local file could not be read.
    #[error("Failed to read source data: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest or data file is not the expected JSON.
    #[error("Failed to parse source data: {0}")]
    Json(#[from] serde_json::Error),

    /// Request failed or its body could not be decoded.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("Unexpected HTTP status {status} for {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// A file parsed as JSON but holds an invalid translation value.
    #[error("Invalid translation data in {location}: {message}")]
    Invalid {
        /// File or URL of the data.
        location: String,
        /// What is wrong with it.
        message: String,
    },

    /// Directory walk or file pattern failed.
    #[error("Failed to discover translation files: {0}")]
    Discovery(String),
}

/// A provider of per-language translation data.
///
/// `overrides` is the merge policy: when `true`, this source's entries replace
/// entries already contributed by earlier sources; when `false`, earlier
/// entries are kept.
#[async_trait]
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Identifier used to remove the source again.
    fn name(&self) -> &str;

    /// Merge policy, see the trait docs.
    fn overrides(&self) -> bool;

    /// Language codes this source can provide.
    ///
    /// # Errors
    /// Returns a [`SourceError`] when the code list cannot be read.
    async fn supported_codes(&self) -> Result<Vec<LanguageCode>, SourceError>;

    /// Translation map of one language.
    ///
    /// # Errors
    /// Returns a [`SourceError`] when the data for `code` cannot be read.
    async fn data(&self, code: &LanguageCode) -> Result<TranslationMap, SourceError>;
}

/// In-memory source.
#[derive(Debug, Clone)]
pub struct InlineSource {
    /// Identifier for removal and logs.
    name: String,
    /// Served data.
    table: TranslationTable,
    /// Merge policy flag.
    overrides: bool,
}

impl InlineSource {
    /// Serves `table` as is.
    #[must_use]
    pub fn new(name: impl Into<String>, table: TranslationTable) -> Self {
        Self { name: name.into(), table, overrides: false }
    }

    /// Lets this source replace entries of earlier sources.
    #[must_use]
    pub const fn with_override(mut self, overrides: bool) -> Self {
        self.overrides = overrides;
        self
    }
}

#[async_trait]
impl DataSource for InlineSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn overrides(&self) -> bool {
        self.overrides
    }

    async fn supported_codes(&self) -> Result<Vec<LanguageCode>, SourceError> {
        let mut codes: Vec<LanguageCode> = self.table.keys().cloned().collect();
        codes.sort();
        Ok(codes)
    }

    async fn data(&self, code: &LanguageCode) -> Result<TranslationMap, SourceError> {
        Ok(self.table.get(code).cloned().unwrap_or_default())
    }
}

/// Supplier producing one language's data on first request.
pub type Supplier = Arc<dyn Fn() -> TranslationMap + Send + Sync>;

/// Source whose per-language data is built on demand.
///
/// Each supplier runs at most once; its result is cached for the lifetime of
/// the source.
pub struct LazySource {
    /// Identifier for removal and logs.
    name: String,
    /// One supplier per advertised code.
    suppliers: HashMap<LanguageCode, Supplier>,
    /// Supplier results by code.
    cache: Mutex<HashMap<LanguageCode, TranslationMap>>,
    /// Merge policy flag.
    overrides: bool,
}

impl LazySource {
    /// Source without languages.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            suppliers: HashMap::new(),
            cache: Mutex::new(HashMap::new()),
            overrides: false,
        }
    }

    /// Advertises `code`, served by `supplier` on first request.
    #[must_use]
    pub fn language(
        mut self,
        code: impl Into<LanguageCode>,
        supplier: impl Fn() -> TranslationMap + Send + Sync + 'static,
    ) -> Self {
        self.suppliers.insert(code.into(), Arc::new(supplier));
        self
    }

    /// Lets this source replace entries of earlier sources.
    #[must_use]
    pub const fn with_override(mut self, overrides: bool) -> Self {
        self.overrides = overrides;
        self
    }

    /// True once the supplier for `code` has run.
    #[must_use]
    pub fn is_loaded(&self, code: &LanguageCode) -> bool {
        self.cache.lock().contains_key(code)
    }
}

impl fmt::Debug for LazySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySource")
            .field("name", &self.name)
            .field("codes", &self.suppliers.keys().collect::<Vec<_>>())
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DataSource for LazySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn overrides(&self) -> bool {
        self.overrides
    }

    async fn supported_codes(&self) -> Result<Vec<LanguageCode>, SourceError> {
        let mut codes: Vec<LanguageCode> = self.suppliers.keys().cloned().collect();
        codes.sort();
        Ok(codes)
    }

    async fn data(&self, code: &LanguageCode) -> Result<TranslationMap, SourceError> {
        let Some(supplier) = self.suppliers.get(code) else {
            return Ok(TranslationMap::new());
        };

        // The lock is held across the supplier so it cannot run twice.
        let mut cache = self.cache.lock();
        let data = cache.entry(code.clone()).or_insert_with(|| {
            tracing::debug!(source = %self.name, %code, "Evaluating lazy translation data");
            supplier()
        });
        Ok(data.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };

    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::{
        table,
        translation_map,
    };
    use crate::value::TranslationValue;

    #[tokio::test]
    async fn inline_source_reports_codes_and_data() {
        let source = InlineSource::new(
            "inline",
            table(&[("en", &[("Hi", "Hi")]), ("vi", &[("Hi", "Chào")])]),
        );

        let codes = source.supported_codes().await.unwrap();
        let vi = source.data(&"vi".into()).await.unwrap();
        let missing = source.data(&"fr".into()).await.unwrap();

        assert_eq!(codes, vec![LanguageCode::from("en"), LanguageCode::from("vi")]);
        assert_eq!(vi["Hi"], TranslationValue::from("Chào"));
        assert!(missing.is_empty());
        assert!(!source.overrides());
    }

    #[tokio::test]
    async fn lazy_supplier_runs_once_per_code() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let source = LazySource::new("lazy").language("en", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            translation_map(&[("Hello", "Hello")])
        });

        assert_that!(source.is_loaded(&"en".into()), eq(false));

        let first = source.data(&"en".into()).await.unwrap();
        let second = source.data(&"en".into()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_that!(source.is_loaded(&"en".into()), eq(true));
    }

    #[tokio::test]
    async fn lazy_source_does_not_evaluate_on_code_listing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let source = LazySource::new("lazy")
            .language("en", TranslationMap::new)
            .language("vi", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                TranslationMap::new()
            });

        let codes = source.supported_codes().await.unwrap();

        assert_eq!(codes.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    fn lazy_source_debug_lists_codes() {
        let source = LazySource::new("lazy").language("en", TranslationMap::new).with_override(true);

        let debug = format!("{source:?}");

        assert_that!(debug, contains_substring("LazySource"));
        assert_that!(debug, contains_substring("overrides: true"));
    }
}
