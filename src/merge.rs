//! Combines the data of an ordered list of sources into one table.
//!
//! Sources are replayed in registration order. For each key, a source whose
//! `overrides()` is `true` replaces what earlier sources contributed; any other
//! source only fills keys that are still absent. A source that fails to answer
//! contributes nothing.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::OnceCell;

use crate::diagnostic::Diagnostics;
use crate::input::source::DataSource;
use crate::types::LanguageCode;
use crate::value::{
    TranslationMap,
    TranslationTable,
};

/// A source as held by an engine, with its advertised codes cached.
pub struct RegisteredSource {
    /// Wrapped source.
    source: Arc<dyn DataSource>,
    /// First successful answer of `supported_codes`.
    codes: OnceCell<Vec<LanguageCode>>,
}

impl RegisteredSource {
    /// Wraps `source` with an empty code cache.
    #[must_use]
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source, codes: OnceCell::new() }
    }

    /// Name of the wrapped source.
    #[must_use]
    pub fn name(&self) -> &str {
        self.source.name()
    }

    /// Merge policy of the wrapped source.
    #[must_use]
    pub fn overrides(&self) -> bool {
        self.source.overrides()
    }

    /// The wrapped source.
    #[must_use]
    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    /// Codes this source can provide. Only a successful answer is cached.
    pub async fn codes(&self, diagnostics: &Diagnostics) -> Vec<LanguageCode> {
        let result = self
            .codes
            .get_or_try_init(|| async { self.source.supported_codes().await })
            .await;

        match result {
            Ok(codes) => codes.clone(),
            Err(e) => {
                diagnostics.warn(&format!(
                    "Source '{}' could not list its languages: {e}",
                    self.name()
                ));
                Vec::new()
            }
        }
    }

    /// Data for `code`, or an empty map when the source fails.
    pub async fn fetch(&self, code: &LanguageCode, diagnostics: &Diagnostics) -> TranslationMap {
        match self.source.data(code).await {
            Ok(data) => {
                tracing::debug!(source = %self.name(), %code, keys = data.len(), "Fetched source data");
                data
            }
            Err(e) => {
                diagnostics.warn(&format!(
                    "Source '{}' has no usable data for '{code}': {e}",
                    self.name()
                ));
                TranslationMap::new()
            }
        }
    }
}

impl fmt::Debug for RegisteredSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredSource")
            .field("source", &self.source)
            .field("codes", &self.codes.get())
            .finish()
    }
}

/// Applies one contribution to `target` under the given override policy.
pub fn apply(target: &mut TranslationMap, contribution: TranslationMap, overrides: bool) {
    if overrides {
        target.extend(contribution);
    } else {
        for (key, value) in contribution {
            target.entry(key).or_insert(value);
        }
    }
}

/// Merges `source`'s data for `code` into `table[code]`, creating the entry
/// when missing.
pub async fn merge_into(
    table: &mut TranslationTable,
    code: &LanguageCode,
    source: &RegisteredSource,
    diagnostics: &Diagnostics,
) {
    let contribution = source.fetch(code, diagnostics).await;
    apply(table.entry(code.clone()).or_default(), contribution, source.overrides());
}

/// Builds the merged map for one language by replaying every source in order.
///
/// Sources that do not list `code` are skipped without being asked for data.
pub async fn build_language(
    sources: &[Arc<RegisteredSource>],
    code: &LanguageCode,
    diagnostics: &Diagnostics,
) -> TranslationMap {
    let mut table = TranslationTable::new();
    table.insert(code.clone(), TranslationMap::new());

    for source in sources {
        if source.codes(diagnostics).await.contains(code) {
            merge_into(&mut table, code, source, diagnostics).await;
        }
    }

    table.remove(code).unwrap_or_default()
}

/// Union of all codes the sources advertise, in first-seen order.
pub async fn known_codes(
    sources: &[Arc<RegisteredSource>],
    diagnostics: &Diagnostics,
) -> Vec<LanguageCode> {
    let per_source = join_all(sources.iter().map(|source| source.codes(diagnostics))).await;

    let mut known = Vec::new();
    for code in per_source.into_iter().flatten() {
        if !known.contains(&code) {
            known.push(code);
        }
    }
    known
}
