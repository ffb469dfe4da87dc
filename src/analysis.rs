//! Key coverage report across loaded languages.

use std::collections::{
    BTreeMap,
    BTreeSet,
};

use crate::types::LanguageCode;
use crate::value::TranslationTable;

/// Keys that are not consistently defined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyReport {
    /// Per language, keys that some other loaded language defines but this
    /// one does not.
    pub missing: BTreeMap<LanguageCode, BTreeSet<String>>,
    /// Per language, override keys with no base entry in that language.
    pub orphan_overrides: BTreeMap<LanguageCode, BTreeSet<String>>,
}

impl KeyReport {
    /// No missing or orphaned keys.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.orphan_overrides.is_empty()
    }

    /// Missing keys summed over languages.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.missing.values().map(BTreeSet::len).sum()
    }

    /// Orphaned override keys summed over languages.
    #[must_use]
    pub fn orphan_count(&self) -> usize {
        self.orphan_overrides.values().map(BTreeSet::len).sum()
    }
}

/// Compares every language of `base` against the union of all its keys, and
/// checks `overrides` against `base`. Languages without gaps are omitted.
#[must_use]
pub fn analyze_keys(base: &TranslationTable, overrides: &TranslationTable) -> KeyReport {
    let all_keys: BTreeSet<&String> = base.values().flat_map(|map| map.keys()).collect();
    let mut report = KeyReport::default();

    for (code, map) in base {
        let missing: BTreeSet<String> = all_keys
            .iter()
            .filter(|key| !map.contains_key(key.as_str()))
            .map(|key| (*key).clone())
            .collect();
        if !missing.is_empty() {
            report.missing.insert(code.clone(), missing);
        }
    }

    for (code, layer) in overrides {
        let orphans: BTreeSet<String> = layer
            .keys()
            .filter(|key| base.get(code).is_none_or(|map| !map.contains_key(key.as_str())))
            .cloned()
            .collect();
        if !orphans.is_empty() {
            report.orphan_overrides.insert(code.clone(), orphans);
        }
    }

    report
}
