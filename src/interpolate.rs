//! Key lookup, condition-branch selection and placeholder substitution.

use crate::types::{
    LanguageCode,
    Params,
    param_to_string,
};
use crate::value::{
    TranslationTable,
    TranslationValue,
};

/// Finds `key` for `code`, checking the override layer before the base table.
#[must_use]
pub fn lookup<'a>(
    key: &str,
    code: &LanguageCode,
    base: &'a TranslationTable,
    overrides: &'a TranslationTable,
) -> Option<&'a TranslationValue> {
    overrides
        .get(code)
        .and_then(|map| map.get(key))
        .or_else(|| base.get(code).and_then(|map| map.get(key)))
}

/// Resolves `key` into display text.
///
/// Never fails: a missing key, a condition whose parameter is absent, or a
/// condition with no matching branch all yield `key` itself.
#[must_use]
pub fn resolve(
    key: &str,
    params: &Params,
    code: &LanguageCode,
    base: &TranslationTable,
    overrides: &TranslationTable,
) -> String {
    lookup(key, code, base, overrides)
        .and_then(|value| render(value, params))
        .unwrap_or_else(|| key.to_string())
}

/// Text of a single value, or `None` when it cannot be evaluated.
fn render(value: &TranslationValue, params: &Params) -> Option<String> {
    match value {
        TranslationValue::Text(text) => Some(substitute(text, params)),
        TranslationValue::Conditions(set) => {
            let selector = param_to_string(params.get(&set.param)?);
            render(set.select(&selector)?, params)
        }
        TranslationValue::Scalar(serde_json::Value::Null) => None,
        TranslationValue::Scalar(other) => Some(param_to_string(other)),
    }
}

/// Characters allowed in a placeholder name.
fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Replaces `@{name}` and bare `@name` placeholders with parameter values.
///
/// The bare form consumes the longest identifier run, so `@price` is not
/// treated as `@p` followed by `rice`. Placeholders naming an absent parameter
/// are copied verbatim. Substituted values are not rescanned.
#[must_use]
pub fn substitute(text: &str, params: &Params) -> String {
    if params.is_empty() || !text.contains('@') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some((before, after)) = rest.split_once('@') {
        out.push_str(before);

        let (name, remainder) = if let Some(inner) = after.strip_prefix('{') {
            inner.split_once('}').unwrap_or(("", after))
        } else {
            let end = after.find(|c: char| !is_identifier_char(c)).unwrap_or(after.len());
            after.split_at(end)
        };

        match params.get(name).filter(|_| !name.is_empty()) {
            Some(value) => {
                out.push_str(&param_to_string(value));
                rest = remainder;
            }
            None => {
                out.push('@');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
