//! Definition Normalizer - raw breakpoint input into canonical ordered form.
//!
//! Accepted shapes (see [`ScreensInput`]):
//!
//! ```text
//! ["100px", "200px"]                                  -> name = value = "100px", ...
//! { "sm": "100px", "md": "200px" }                    -> min widths
//! { "sm": { "min": "100px" }, "md": { "max": "1px" } } -> single range each
//! { "sm": [{ "min": "100px" }, { "max": "200px" }] }  -> one screen, two ranges
//! ```
//!
//! A root list of tuples (`[["sm", "100px"], ...]`) is rejected.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::{Result, ScreensError};
use crate::types::{NormalizedScreen, RangeValue, ScreensInput};

/// Normalize raw definitions, preserving declaration order.
///
/// Pure and deterministic. Fails with [`ScreensError::Configuration`] on the
/// nested-tuple root form, on malformed entries, or on duplicate names.
pub fn normalize_screens(input: &ScreensInput) -> Result<Vec<NormalizedScreen>> {
    let screens = match input.as_json() {
        Value::Null => Vec::new(),
        Value::Array(entries) => entries
            .iter()
            .map(normalize_list_entry)
            .collect::<Result<Vec<_>>>()?,
        Value::Object(map) => map
            .iter()
            .map(|(name, options)| normalize_named(name, options))
            .collect::<Result<Vec<_>>>()?,
        other => {
            return Err(ScreensError::configuration(format!(
                "screens must be a list or a mapping, got `{other}`"
            )));
        }
    };

    let mut seen = HashSet::with_capacity(screens.len());
    for screen in &screens {
        if !seen.insert(screen.name.as_str()) {
            return Err(ScreensError::configuration(format!(
                "duplicate screen name `{}`",
                screen.name
            )));
        }
    }

    Ok(screens)
}

fn normalize_list_entry(entry: &Value) -> Result<NormalizedScreen> {
    match entry {
        Value::String(s) => Ok(NormalizedScreen::new(s.clone(), vec![RangeValue::min(s.clone())])),
        Value::Array(_) => Err(ScreensError::configuration(
            "the tuple syntax is not supported for `screens`",
        )),
        other => Err(ScreensError::configuration(format!(
            "unsupported screen entry `{other}`"
        ))),
    }
}

fn normalize_named(name: &str, options: &Value) -> Result<NormalizedScreen> {
    let values = match options {
        Value::String(s) => vec![RangeValue::min(s.clone())],
        Value::Array(items) => items
            .iter()
            .map(|item| resolve_value(name, item))
            .collect::<Result<Vec<_>>>()?,
        other => vec![resolve_value(name, other)?],
    };
    Ok(NormalizedScreen::new(name, values))
}

fn resolve_value(name: &str, value: &Value) -> Result<RangeValue> {
    match value {
        Value::String(s) => Ok(RangeValue::min(s.clone())),
        Value::Object(map) => {
            // `min-width` only stands in for a missing `min`
            let min = match string_field(name, map, "min")? {
                Some(min) => Some(min),
                None => string_field(name, map, "min-width")?,
            };
            Ok(RangeValue {
                min,
                max: string_field(name, map, "max")?,
                raw: string_field(name, map, "raw")?,
            })
        }
        other => Err(ScreensError::configuration(format!(
            "screen `{name}` has unsupported value `{other}`"
        ))),
    }
}

fn string_field(name: &str, map: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ScreensError::configuration(format!(
            "screen `{name}` field `{key}` must be a string, got `{other}`"
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================
