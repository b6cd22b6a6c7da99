//! Search response normalization.
//!
//! The registry does not return one stable shape across endpoints and
//! versions. A decoded body is classified into one of three recognized
//! shapes and always normalized into an ordered `Vec<PackageRecord>`;
//! anything unrecognized normalizes to an empty sequence.

use serde_json::{Map, Value};

use crate::package::PackageRecord;

/// Recognized shapes of a decoded search response
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResponse {
    /// Search-engine envelope: `{"hits": {"hits": [{"_source": {...}}]}}`
    Envelope(Vec<Value>),
    /// Plain ordered array of records
    Sequence(Vec<Value>),
    /// Object with a numeric `length` and index keys `"0"`, `"1"`, ...
    ArrayLike(Vec<Value>),
    /// Anything else
    Unrecognized(Value),
}

impl SearchResponse {
    /// Classify a decoded JSON value by inspecting its shape
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Array(items) => SearchResponse::Sequence(items),
            Value::Object(map) => {
                if let Some(hits) = envelope_hits(&map) {
                    return SearchResponse::Envelope(hits);
                }
                match array_like_items(&map) {
                    Some(items) => SearchResponse::ArrayLike(items),
                    None => SearchResponse::Unrecognized(Value::Object(map)),
                }
            }
            other => SearchResponse::Unrecognized(other),
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            SearchResponse::Envelope(_) => "envelope",
            SearchResponse::Sequence(_) => "sequence",
            SearchResponse::ArrayLike(_) => "array-like",
            SearchResponse::Unrecognized(_) => "unrecognized",
        }
    }

    /// Decode every entry into a record, preserving order.
    ///
    /// Null entries are dropped silently; entries that fail to decode are
    /// dropped with a warning.
    pub fn into_records(self) -> Vec<PackageRecord> {
        let items = match self {
            SearchResponse::Envelope(items)
            | SearchResponse::Sequence(items)
            | SearchResponse::ArrayLike(items) => items,
            SearchResponse::Unrecognized(value) => {
                tracing::error!(
                    body = %truncate_for_log(&value),
                    "Unexpected API response structure"
                );
                return Vec::new();
            }
        };

        items
            .into_iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .filter_map(|(position, item)| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(position, error = %e, "Skipping undecodable package record");
                    None
                }
            })
            .collect()
    }
}

/// Classify and decode in one step. Total: never fails.
pub fn normalize(value: Value) -> Vec<PackageRecord> {
    let response = SearchResponse::classify(value);
    tracing::debug!(shape = response.shape(), "Normalizing search response");
    response.into_records()
}

fn envelope_hits(map: &Map<String, Value>) -> Option<Vec<Value>> {
    let hits = map.get("hits")?.get("hits")?.as_array()?;
    Some(
        hits.iter()
            .map(|hit| hit.get("_source").cloned().unwrap_or(Value::Null))
            .collect(),
    )
}

fn array_like_items(map: &Map<String, Value>) -> Option<Vec<Value>> {
    let length = array_like_length(map.get("length")?)?;

    let mut indexed: Vec<(u64, &Value)> = map
        .iter()
        .filter_map(|(key, value)| {
            let index: u64 = key.parse().ok()?;
            // "01" is a property name, not an index
            (index.to_string() == *key && index < length).then_some((index, value))
        })
        .collect();
    indexed.sort_by_key(|(index, _)| *index);

    Some(indexed.into_iter().map(|(_, value)| value.clone()).collect())
}

/// Numeric `length` with JS `ToLength` semantics: truncated, negatives
/// clamp to zero, non-finite values are not lengths.
fn array_like_length(value: &Value) -> Option<u64> {
    let number = value.as_f64()?;
    if !number.is_finite() {
        return None;
    }
    Some(number.trunc().max(0.0) as u64)
}

fn truncate_for_log(value: &Value) -> String {
    let text = value.to_string();
    match text.char_indices().nth(200) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(records: &[PackageRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_envelope_shape() {
        let body = json!({
            "hits": {
                "total": 2,
                "hits": [
                    {"_id": "a", "_source": {"name": "aws", "version": "2.0.0"}},
                    {"_id": "b", "_source": {"name": "gcp", "version": "1.0.0"}}
                ]
            }
        });
        let response = SearchResponse::classify(body);
        assert_eq!(response.shape(), "envelope");
        assert_eq!(names(&response.into_records()), vec!["aws", "gcp"]);
    }

    #[test]
    fn test_envelope_hit_without_source_is_dropped() {
        let body = json!({"hits": {"hits": [{"_id": "x"}, {"_source": {"name": "ok"}}]}});
        assert_eq!(names(&normalize(body)), vec!["ok"]);
    }

    #[test]
    fn test_sequence_shape() {
        let body = json!([{"name": "nginx"}, null, {"name": "apache"}]);
        assert_eq!(names(&normalize(body)), vec!["nginx", "apache"]);
    }

    #[test]
    fn test_array_like_shape_orders_by_index() {
        let body = json!({
            "length": 3,
            "2": {"name": "third"},
            "0": {"name": "first"},
            "1": {"name": "second"},
            "extra": {"name": "ignored"}
        });
        let response = SearchResponse::classify(body);
        assert_eq!(response.shape(), "array-like");
        assert_eq!(
            names(&response.into_records()),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn test_array_like_ignores_indices_past_length_and_holes() {
        let body = json!({
            "length": 2.7,
            "0": {"name": "a"},
            "3": {"name": "late"},
            "01": {"name": "b"}
        });
        assert_eq!(names(&normalize(body)), vec!["a"]);
    }

    #[test]
    fn test_array_like_negative_length_is_empty() {
        let body = json!({"length": -4, "0": {"name": "a"}});
        assert_eq!(SearchResponse::classify(body.clone()).shape(), "array-like");
        assert!(normalize(body).is_empty());
    }

    #[test]
    fn test_unrecognized_shapes_yield_empty() {
        for body in [
            json!(null),
            json!("text"),
            json!(42),
            json!({"results": []}),
            json!({"hits": {"hits": "nope"}}),
            json!({"length": "3", "0": {"name": "a"}}),
        ] {
            assert!(normalize(body).is_empty());
        }
    }

    #[test]
    fn test_undecodable_records_are_skipped() {
        let body = json!([{"version": "1.0.0"}, {"name": "kept"}, 7]);
        assert_eq!(names(&normalize(body)), vec!["kept"]);
    }
}
