//! List-query representation shared by both backends.
//!
//! A [`Query`] is built by the REST layer from request parameters and carries
//! three matching styles:
//!
//! - free-text groups: case-insensitive substring match, OR-ed over a field
//!   list, with multiple groups AND-ed together (the `search`/`detailSearch`
//!   pair on VOC tickets);
//! - per-field substring filters (e.g. hardware `assetCode`);
//! - exact-equality filters for categorical fields (status, category, type);
//! - inclusive date ranges on RFC 3339 normalized date fields.
//!
//! The in-memory matcher below is the reference semantics; the MongoDB
//! backend translates the same query into an equivalent filter document, so
//! both backends return identical result sets for identical content.

use serde_json::Value;

/// One free-text term matched as a substring over a set of fields.
#[derive(Debug, Clone)]
pub struct TextGroup {
    /// The search term, matched case-insensitively.
    pub term: String,
    /// Fields the term may appear in (OR semantics).
    pub fields: &'static [&'static str],
}

/// An inclusive range filter on a date field.
///
/// Bounds are fixed-width RFC 3339 UTC strings, so lexicographic comparison
/// is equivalent to chronological comparison.
#[derive(Debug, Clone)]
pub struct DateRange {
    /// The date field to filter on.
    pub field: &'static str,
    /// Inclusive lower bound.
    pub from: Option<String>,
    /// Inclusive upper bound.
    pub to: Option<String>,
}

/// A list query: filters plus the soft-delete visibility switch.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Free-text groups, AND-ed together.
    pub groups: Vec<TextGroup>,
    /// Per-field case-insensitive substring filters.
    pub substring: Vec<(String, String)>,
    /// Exact-equality filters.
    pub exact: Vec<(String, String)>,
    /// Inclusive date-range filters.
    pub ranges: Vec<DateRange>,
    /// `isDeleted` filter injected by the store for soft-delete kinds.
    pub deleted: Option<bool>,
}

impl Query {
    /// Creates an empty query (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a free-text group over the given fields, when a term is present.
    pub fn with_search(mut self, term: Option<String>, fields: &'static [&'static str]) -> Self {
        if let Some(term) = term.filter(|t| !t.is_empty()) {
            self.groups.push(TextGroup { term, fields });
        }
        self
    }

    /// Adds a per-field substring filter, when a value is present.
    pub fn with_substring(mut self, field: &str, value: Option<String>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.substring.push((field.to_string(), value));
        }
        self
    }

    /// Adds an exact-equality filter, when a value is present.
    pub fn with_exact(mut self, field: &str, value: Option<String>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.exact.push((field.to_string(), value));
        }
        self
    }

    /// Adds an inclusive date range, when at least one bound is present.
    pub fn with_range(
        mut self,
        field: &'static str,
        from: Option<String>,
        to: Option<String>,
    ) -> Self {
        if from.is_some() || to.is_some() {
            self.ranges.push(DateRange { field, from, to });
        }
        self
    }

    /// Tests a document against this query (in-memory semantics).
    pub fn matches(&self, doc: &Value) -> bool {
        if let Some(deleted) = self.deleted {
            if doc.get("isDeleted").and_then(Value::as_bool).unwrap_or(false) != deleted {
                return false;
            }
        }

        for group in &self.groups {
            let needle = group.term.to_lowercase();
            let hit = group.fields.iter().any(|field| {
                field_str(doc, field)
                    .map(|v| v.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            });
            if !hit {
                return false;
            }
        }

        for (field, term) in &self.substring {
            let needle = term.to_lowercase();
            let hit = field_str(doc, field)
                .map(|v| v.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !hit {
                return false;
            }
        }

        for (field, expected) in &self.exact {
            if field_str(doc, field) != Some(expected.as_str()) {
                return false;
            }
        }

        for range in &self.ranges {
            let Some(value) = field_str(doc, range.field) else {
                return false;
            };
            if let Some(from) = &range.from {
                if value < from.as_str() {
                    return false;
                }
            }
            if let Some(to) = &range.to {
                if value > to.as_str() {
                    return false;
                }
            }
        }

        true
    }
}

/// Reads a string field off a document.
fn field_str<'a>(doc: &'a Value, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(Value::as_str)
}

/// Sorts documents descending by the given fields, in order of precedence.
pub fn sort_descending(docs: &mut [Value], fields: &[&str]) {
    docs.sort_by(|a, b| {
        for field in fields {
            let ord = compare_field(b, a, field);
            if ord != std::cmp::Ordering::Equal {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    });
}

fn compare_field(a: &Value, b: &Value, field: &str) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a.get(field), b.get(field)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[&str] = &["assetName", "remarks"];

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let query = Query::new().with_search(Some("offi".to_string()), FIELDS);
        assert!(query.matches(&json!({"assetName": "MS Office 2021"})));
        assert!(query.matches(&json!({"assetName": "", "remarks": "OFFICE seat"})));
        assert!(!query.matches(&json!({"assetName": "AutoCAD"})));
    }

    #[test]
    fn test_groups_are_anded() {
        let query = Query::new()
            .with_search(Some("office".to_string()), FIELDS)
            .with_search(Some("seat".to_string()), FIELDS);
        assert!(query.matches(&json!({"assetName": "Office", "remarks": "3 seats"})));
        assert!(!query.matches(&json!({"assetName": "Office", "remarks": ""})));
    }

    #[test]
    fn test_exact_match_is_not_substring() {
        let query = Query::new().with_exact("status", Some("완료".to_string()));
        assert!(query.matches(&json!({"status": "완료"})));
        assert!(!query.matches(&json!({"status": "완료됨"})));
        assert!(!query.matches(&json!({})));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let query = Query::new().with_range(
            "regDate",
            Some("2024-03-01T00:00:00.000Z".to_string()),
            Some("2024-03-31T23:59:59.999Z".to_string()),
        );
        assert!(query.matches(&json!({"regDate": "2024-03-01T00:00:00.000Z"})));
        assert!(query.matches(&json!({"regDate": "2024-03-31T10:00:00.000Z"})));
        assert!(!query.matches(&json!({"regDate": "2024-04-01T00:00:00.000Z"})));
        assert!(!query.matches(&json!({})));
    }

    #[test]
    fn test_deleted_filter() {
        let mut query = Query::new();
        query.deleted = Some(false);
        assert!(query.matches(&json!({"assetName": "x"})));
        assert!(query.matches(&json!({"isDeleted": false})));
        assert!(!query.matches(&json!({"isDeleted": true})));
    }

    #[test]
    fn test_sort_descending_numeric_then_string() {
        let mut docs = vec![
            json!({"no": 1, "regDate": "2024-03-01T00:00:00.000Z"}),
            json!({"no": 3, "regDate": "2024-03-01T00:00:00.000Z"}),
            json!({"no": 2, "regDate": "2024-04-01T00:00:00.000Z"}),
        ];
        sort_descending(&mut docs, &["regDate", "no"]);
        let nos: Vec<_> = docs.iter().map(|d| d["no"].as_i64().unwrap()).collect();
        assert_eq!(nos, vec![2, 3, 1]);
    }
}
