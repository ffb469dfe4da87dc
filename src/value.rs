//! Translation value model and its JSON form.
//!
//! A translation entry is either plain text or a [`ConditionSet`] that picks a
//! branch from the stringified value of one parameter:
//!
//! ```json
//! {
//!   "Hello": "Xin chào",
//!   "You have @{number} dollar": {
//!     "param": "number",
//!     "conditions": { "0": "You have zero dollars", "default": "You have @{number} dollars" }
//!   }
//! }
//! ```

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
};
use serde_json::{
    Map,
    Value,
};

use crate::error::EngineError;
use crate::types::LanguageCode;

/// Branch key used when no other branch matches.
pub const DEFAULT_BRANCH: &str = "default";
/// Secondary catch-all branch key, tried after [`DEFAULT_BRANCH`].
pub const WILDCARD_BRANCH: &str = "_";

/// JSON field naming the selecting parameter.
const PARAM_FIELD: &str = "param";
/// JSON field holding the branches.
const CONDITIONS_FIELD: &str = "conditions";

/// A single translation entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationValue {
    /// Plain text with optional `@name` / `@{name}` placeholders.
    Text(String),
    /// Branches selected by one parameter.
    Conditions(ConditionSet),
    /// Non-string leaves (null, numbers, booleans, arrays) kept exactly as read.
    Scalar(Value),
}

/// Parameterized branch selection, typically used for plurals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionSet {
    /// Parameter whose stringified value selects the branch.
    pub param: String,
    /// Branches in declaration order.
    pub conditions: Vec<(String, TranslationValue)>,
}

/// Key -> value map for one language.
pub type TranslationMap = HashMap<String, TranslationValue>;

/// Language -> key -> value.
pub type TranslationTable = HashMap<LanguageCode, TranslationMap>;

impl ConditionSet {
    /// Empty set selecting on `param`.
    #[must_use]
    pub fn new(param: impl Into<String>) -> Self {
        Self { param: param.into(), conditions: Vec::new() }
    }

    /// Appends a branch, replacing an existing one with the same key in place.
    #[must_use]
    pub fn branch(mut self, key: impl Into<String>, value: impl Into<TranslationValue>) -> Self {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.conditions.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.conditions.push((key, value));
        }
        self
    }

    /// Branch with exactly this key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TranslationValue> {
        self.conditions.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Branch for `selector`, else `default`, else `_`.
    #[must_use]
    pub fn select(&self, selector: &str) -> Option<&TranslationValue> {
        self.get(selector).or_else(|| self.get(DEFAULT_BRANCH)).or_else(|| self.get(WILDCARD_BRANCH))
    }

    /// `Ok(None)` when the object lacks either field.
    fn from_object(object: &Map<String, Value>) -> Result<Option<Self>, String> {
        let (Some(param), Some(conditions)) = (object.get(PARAM_FIELD), object.get(CONDITIONS_FIELD))
        else {
            return Ok(None);
        };
        let Value::String(param) = param else {
            return Err(format!("condition `param` must be a string, got {param}"));
        };
        let Value::Object(branches) = conditions else {
            return Err(format!("condition `conditions` must be an object, got {conditions}"));
        };

        let conditions = branches
            .iter()
            .map(|(key, value)| TranslationValue::try_from(value.clone()).map(|v| (key.clone(), v)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Self { param: param.clone(), conditions }))
    }
}

impl TranslationValue {
    /// Returns the text when this is [`TranslationValue::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// JSON form: strings stay strings, condition sets become `{param, conditions}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Scalar(value) => value.clone(),
            Self::Conditions(set) => {
                let conditions: Map<String, Value> =
                    set.conditions.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();
                let mut object = Map::new();
                object.insert(PARAM_FIELD.to_string(), Value::String(set.param.clone()));
                object.insert(CONDITIONS_FIELD.to_string(), Value::Object(conditions));
                Value::Object(object)
            }
        }
    }

    /// Serializes to a JSON string.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    /// Parses a value previously produced by [`Self::to_json_string`].
    ///
    /// # Errors
    /// Returns [`EngineError::Decode`] for malformed input.
    pub fn from_json_str(text: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl TryFrom<Value> for TranslationValue {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(text) => Ok(Self::Text(text)),
            Value::Object(object) => ConditionSet::from_object(&object)?.map(Self::Conditions).ok_or_else(
                || "object translation values must have `param` and `conditions` fields".to_string(),
            ),
            other => Ok(Self::Scalar(other)),
        }
    }
}

impl From<&str> for TranslationValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TranslationValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<ConditionSet> for TranslationValue {
    fn from(set: ConditionSet) -> Self {
        Self::Conditions(set)
    }
}

impl Serialize for ConditionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        /// Branch list written as a JSON object in declaration order.
        struct Branches<'a>(&'a [(String, TranslationValue)]);

        impl Serialize for Branches<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (key, value) in self.0 {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(PARAM_FIELD, &self.param)?;
        map.serialize_entry(CONDITIONS_FIELD, &Branches(&self.conditions))?;
        map.end()
    }
}

impl Serialize for TranslationValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Conditions(set) => set.serialize(serializer),
            Self::Scalar(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TranslationValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// Converts a JSON object into a [`TranslationMap`].
///
/// # Errors
/// Returns [`EngineError::Decode`] when `value` is not an object of valid entries.
pub fn map_from_json(value: Value) -> Result<TranslationMap, EngineError> {
    Ok(serde_json::from_value(value)?)
}
