//! Core types used throughout the project.

use std::collections::HashMap;
use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

/// A language identifier such as `en`, `vi` or `pt-BR`.
///
/// Equality is structural: `en-US` and `en_US` are different codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Wraps `code` without normalizing it.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Language subtag without any region qualifier (`pt-BR` -> `pt`).
    #[must_use]
    pub fn language(&self) -> &str {
        self.0.split(['-', '_']).next().unwrap_or(&self.0)
    }

    /// Region qualifier, if any (`pt-BR` -> `BR`, `zh-Hant-TW` -> `TW`).
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.0.split(['-', '_']).skip(1).find(|part| {
            part.len() == 2 || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()))
        })
    }

    /// True when both codes share the same language subtag, ignoring case and region.
    #[must_use]
    pub fn same_language(&self, other: &Self) -> bool {
        self.language().eq_ignore_ascii_case(other.language())
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for LanguageCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl From<&LanguageCode> for LanguageCode {
    fn from(code: &LanguageCode) -> Self {
        code.clone()
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Interpolation parameters keyed by placeholder name.
pub type Params = HashMap<String, Value>;

/// Builds [`Params`] from `(name, value)` pairs.
///
/// ```
/// use i18n_runtime::types::params;
///
/// let params = params([("number", 100)]);
/// assert_eq!(params["number"], 100);
/// ```
#[must_use]
pub fn params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Canonical textual form of a parameter value.
///
/// Strings are used as-is; numbers, booleans and null use their JSON spelling.
#[must_use]
pub fn param_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
