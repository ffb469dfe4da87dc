//! Shared helpers for unit tests.
#![cfg(test)]

use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};

use crate::types::LanguageCode;
use crate::value::{
    TranslationMap,
    TranslationTable,
    TranslationValue,
};

/// Builds a map of plain-text entries.
pub(crate) fn translation_map(entries: &[(&str, &str)]) -> TranslationMap {
    entries.iter().map(|(key, value)| ((*key).to_string(), TranslationValue::from(*value))).collect()
}

/// Builds a table of plain-text entries per language.
pub(crate) fn table(languages: &[(&str, &[(&str, &str)])]) -> TranslationTable {
    languages
        .iter()
        .map(|(code, entries)| (LanguageCode::from(*code), translation_map(entries)))
        .collect()
}

/// Instance name that no other test uses.
pub(crate) fn unique_name(prefix: &str) -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    format!("{prefix}-{}", COUNTER.fetch_add(1, Ordering::SeqCst))
}
