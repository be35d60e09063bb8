//! Core types for spark-screens.
//!
//! - [`ScreensInput`] - raw, heterogeneous breakpoint definitions
//! - [`RangeValue`] / [`NormalizedScreen`] - the canonical ordered form
//! - [`ScreensConfig`] / [`Resolved`] - mapping breakpoints to app values

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

// =============================================================================
// Default Breakpoints
// =============================================================================

/// Breakpoint table used when an engine is built without definitions.
pub const DEFAULT_SCREENS: [(&str, &str); 4] = [
    ("sm", "640px"),
    ("md", "768px"),
    ("lg", "1024px"),
    ("xl", "1280px"),
];

/// Key a [`ScreensConfig`] reads its fallback value from.
pub const DEFAULT_KEY: &str = "default";

// =============================================================================
// Raw Input
// =============================================================================

/// Raw breakpoint definitions, in any of the supported shapes:
///
/// ```text
/// ["100px", "200px"]                                  // bare strings
/// { "sm": "100px", "md": "200px" }                    // name -> min width
/// { "sm": { "min": "100px" }, "md": { "max": "1px" } } // name -> range
/// { "sm": [{ "min": "100px" }, { "max": "200px" }] }  // name -> ranges (OR)
/// ```
///
/// Object key order is the declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreensInput(Value);

impl ScreensInput {
    /// Wrap an already parsed JSON value.
    pub fn from_json(value: Value) -> Self {
        Self(value)
    }

    /// Parse definitions from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(Self(serde_json::from_str(text)?))
    }

    /// The default breakpoint table as input.
    pub fn defaults() -> Self {
        DEFAULT_SCREENS.into_iter().collect()
    }

    /// Borrow the raw JSON shape.
    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

impl Default for ScreensInput {
    fn default() -> Self {
        Self::defaults()
    }
}

impl From<Value> for ScreensInput {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl<const N: usize> From<[&str; N]> for ScreensInput {
    fn from(names: [&str; N]) -> Self {
        Self(Value::Array(names.iter().map(|s| Value::from(*s)).collect()))
    }
}

impl From<Vec<String>> for ScreensInput {
    fn from(names: Vec<String>) -> Self {
        Self(Value::Array(names.into_iter().map(Value::from).collect()))
    }
}

/// Collect `(name, definition)` pairs into the mapping shape.
impl<K, V> FromIterator<(K, V)> for ScreensInput
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map: Map<String, Value> = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self(Value::Object(map))
    }
}

// =============================================================================
// Normalized Form
// =============================================================================

/// One width range of a breakpoint.
///
/// `raw`, when set, is the entire compiled clause and bypasses `min`/`max`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl RangeValue {
    /// A range with only a lower bound.
    pub fn min(min: impl Into<String>) -> Self {
        Self { min: Some(min.into()), ..Self::default() }
    }

    /// A range with only an upper bound.
    pub fn max(max: impl Into<String>) -> Self {
        Self { max: Some(max.into()), ..Self::default() }
    }

    /// A range with both bounds.
    pub fn between(min: impl Into<String>, max: impl Into<String>) -> Self {
        Self { min: Some(min.into()), max: Some(max.into()), raw: None }
    }

    /// A verbatim media-query clause.
    pub fn raw(raw: impl Into<String>) -> Self {
        Self { raw: Some(raw.into()), ..Self::default() }
    }
}

impl From<RangeValue> for Value {
    fn from(range: RangeValue) -> Self {
        let mut map = Map::new();
        if let Some(min) = range.min {
            map.insert("min".into(), Value::String(min));
        }
        if let Some(max) = range.max {
            map.insert("max".into(), Value::String(max));
        }
        if let Some(raw) = range.raw {
            map.insert("raw".into(), Value::String(raw));
        }
        Value::Object(map)
    }
}

/// A named breakpoint with its ordered set of ranges (OR-combined).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedScreen {
    pub name: String,
    pub values: Vec<RangeValue>,
}

impl NormalizedScreen {
    pub fn new(name: impl Into<String>, values: Vec<RangeValue>) -> Self {
        Self { name: name.into(), values }
    }
}

// =============================================================================
// Resolver Config
// =============================================================================

/// Maps breakpoint names to application values, with an optional fallback.
///
/// Collecting pairs treats the [`DEFAULT_KEY`] entry as the fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreensConfig<T> {
    values: IndexMap<String, T>,
    default: Option<T>,
}

impl<T> ScreensConfig<T> {
    pub fn new() -> Self {
        Self { values: IndexMap::new(), default: None }
    }

    /// Add a value for a breakpoint.
    pub fn with(mut self, name: impl Into<String>, value: T) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Set the fallback used when nothing matches.
    pub fn with_default(mut self, value: T) -> Self {
        self.default = Some(value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }
}

impl<T> Default for ScreensConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for ScreensConfig<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut config = Self::new();
        for (key, value) in iter {
            let key = key.into();
            if key == DEFAULT_KEY {
                config.default = Some(value);
            } else {
                config.values.insert(key, value);
            }
        }
        config
    }
}

impl ScreensConfig<Value> {
    /// Build a config from a JSON object; non-objects give an empty config.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => Self::new(),
        }
    }
}

/// A breakpoint name after config mapping: either the configured value or the bare name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<T> {
    Value(T),
    Name(String),
}

impl<T> Resolved<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Name(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Value(_) => None,
            Self::Name(n) => Some(n),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_from_names() {
        let input = ScreensInput::from(["a", "b"]);
        assert_eq!(input.as_json(), &json!(["a", "b"]));
    }

    #[test]
    fn test_input_from_pairs_keeps_order() {
        let input: ScreensInput = [("xl", "1280px"), ("sm", "640px")].into_iter().collect();
        let keys: Vec<_> = input.as_json().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["xl", "sm"]);
    }

    #[test]
    fn test_input_from_json_str() {
        let input = ScreensInput::from_json_str(r#"{"md": "768px", "sm": "640px"}"#).unwrap();
        let keys: Vec<_> = input.as_json().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["md", "sm"]);
        assert!(ScreensInput::from_json_str("[").is_err());
    }

    #[test]
    fn test_defaults() {
        let input = ScreensInput::default();
        assert_eq!(input.as_json()["lg"], json!("1024px"));
    }

    #[test]
    fn test_range_value_to_json() {
        let value: Value = RangeValue::between("1px", "2px").into();
        assert_eq!(value, json!({ "min": "1px", "max": "2px" }));
        let value: Value = RangeValue::raw("print").into();
        assert_eq!(value, json!({ "raw": "print" }));
    }

    #[test]
    fn test_config_default_key() {
        let config: ScreensConfig<i32> = [("sm", 1), ("default", 9)].into_iter().collect();
        assert_eq!(config.get("sm"), Some(&1));
        assert!(!config.contains("default"));
        assert_eq!(config.default_value(), Some(&9));
    }

    #[test]
    fn test_config_from_json() {
        let config = ScreensConfig::from_json(json!({ "md": "wide", "default": "narrow" }));
        assert_eq!(config.get("md"), Some(&json!("wide")));
        assert_eq!(config.default_value(), Some(&json!("narrow")));
        assert!(ScreensConfig::from_json(json!(3)).default_value().is_none());
    }

    #[test]
    fn test_resolved_accessors() {
        let v: Resolved<i32> = Resolved::Value(2);
        assert_eq!(v.value(), Some(&2));
        assert_eq!(v.name(), None);
        let n: Resolved<i32> = Resolved::Name("lg".into());
        assert_eq!(n.name(), Some("lg"));
    }
}
