//! Media-Query Compiler - breakpoint ranges into one media-query string.
//!
//! ```text
//! [{ min: 100px }]                      -> "(min-width: 100px)"
//! [{ min: 100px, max: 200px }]          -> "(min-width: 100px) and (max-width: 200px)"
//! [{ raw: print }]                      -> "print"
//! [{ max: 100px }, { min: 300px }]      -> "(max-width: 100px), (min-width: 300px)"
//! ```
//!
//! The output goes straight to the host's native matcher, so the grammar
//! must be exact.

use crate::types::RangeValue;

/// Compile a breakpoint's ranges into a media-query list.
pub fn build_media_query(values: &[RangeValue]) -> String {
    values.iter().map(build_clause).collect::<Vec<_>>().join(", ")
}

fn build_clause(value: &RangeValue) -> String {
    if let Some(raw) = &value.raw {
        return raw.clone();
    }

    let min = present(&value.min).map(|min| format!("(min-width: {min})"));
    let max = present(&value.max).map(|max| format!("(max-width: {max})"));

    min.into_iter().chain(max).collect::<Vec<_>>().join(" and ")
}

/// Empty bounds are treated as absent.
fn present(bound: &Option<String>) -> Option<&str> {
    bound.as_deref().filter(|b| !b.is_empty())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_min_only() {
        assert_eq!(build_media_query(&[RangeValue::min("100px")]), "(min-width: 100px)");
    }

    #[test]
    fn test_max_only() {
        assert_eq!(build_media_query(&[RangeValue::max("200px")]), "(max-width: 200px)");
    }

    #[test]
    fn test_min_and_max() {
        assert_eq!(
            build_media_query(&[RangeValue::between("100px", "200px")]),
            "(min-width: 100px) and (max-width: 200px)"
        );
    }

    #[test]
    fn test_raw_verbatim() {
        assert_eq!(build_media_query(&[RangeValue::raw("print")]), "print");
    }

    #[test]
    fn test_raw_bypasses_bounds() {
        let value = RangeValue {
            min: Some("1px".into()),
            max: None,
            raw: Some("(orientation: portrait)".into()),
        };
        assert_eq!(build_media_query(&[value]), "(orientation: portrait)");
    }

    #[test]
    fn test_multiple_values_joined() {
        assert_eq!(
            build_media_query(&[RangeValue::max("100px"), RangeValue::min("300px")]),
            "(max-width: 100px), (min-width: 300px)"
        );
    }

    #[test]
    fn test_empty_value_is_empty_clause() {
        assert_eq!(build_media_query(&[RangeValue::default()]), "");
        assert_eq!(build_media_query(&[]), "");
    }

    #[test]
    fn test_empty_bound_skipped() {
        let value = RangeValue { min: Some(String::new()), max: Some("5px".into()), raw: None };
        assert_eq!(build_media_query(&[value]), "(max-width: 5px)");
    }

    proptest! {
        #[test]
        fn prop_one_clause_per_value(widths in proptest::collection::vec(1u32..5000, 1..6)) {
            let values: Vec<_> = widths.iter().map(|w| RangeValue::min(format!("{w}px"))).collect();
            let query = build_media_query(&values);
            prop_assert_eq!(query.split(", ").count(), widths.len());
        }
    }
}
