//! Canonical shape for upstream list payloads.
//!
//! The test-management service is inconsistent about list results: some
//! endpoints return a bare array, some an envelope with the items under
//! `values`, some a single object with no wrapper at all. Every list-backed
//! tool funnels the raw payload through [`normalize_page`] immediately after
//! the remote call, so nothing downstream ever branches on payload shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pagination metadata passed through from the upstream envelope.
///
/// Absent metadata gets conservative defaults: no pagination information
/// means the result is complete (`is_last = true`), never "more pages exist".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<u64>,
    pub is_last: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            max_results: None,
            start_at: None,
            is_last: true,
            next: None,
        }
    }
}

/// The one list shape the rest of the crate sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPage {
    pub items: Vec<Value>,
    pub total: u64,
    #[serde(flatten)]
    pub page: PageInfo,
}

impl NormalizedPage {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: PageInfo::default(),
        }
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Container fields an upstream envelope may hold its item list under.
/// `items` is our own canonical name, which is what makes re-normalizing an
/// already-normalized envelope a no-op.
const LIST_FIELDS: &[&str] = &["values", "items"];

/// Normalizes a heterogeneous upstream payload into a [`NormalizedPage`].
///
/// Rules, first match wins:
/// 1. bare array: the array is the item list, total is its length
/// 2. envelope with a list field: that list, total from the envelope's own
///    declared total when numeric, else the list length
/// 3. single object: wrapped as a one-element list, total 1
/// 4. anything else: empty list, total 0
///
/// Idempotent: `normalize_page(normalize_page(x).into_value())` equals
/// `normalize_page(x)` for all `x`.
pub fn normalize_page(raw: &Value) -> NormalizedPage {
    if let Value::Array(items) = raw {
        return NormalizedPage {
            total: items.len() as u64,
            items: items.clone(),
            page: PageInfo::default(),
        };
    }

    if let Value::Object(map) = raw {
        for field in LIST_FIELDS {
            if let Some(Value::Array(items)) = map.get(*field) {
                let total = map
                    .get("total")
                    .and_then(Value::as_u64)
                    .unwrap_or(items.len() as u64);
                return NormalizedPage {
                    items: items.clone(),
                    total,
                    page: page_info(raw),
                };
            }
        }
        // A plain entity with no list wrapper at all.
        return NormalizedPage {
            items: vec![raw.clone()],
            total: 1,
            page: PageInfo::default(),
        };
    }

    NormalizedPage::empty()
}

fn page_info(raw: &Value) -> PageInfo {
    PageInfo {
        max_results: raw.get("maxResults").and_then(Value::as_u64),
        start_at: raw.get("startAt").and_then(Value::as_u64),
        is_last: raw.get("isLast").and_then(Value::as_bool).unwrap_or(true),
        next: raw
            .get("next")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_array_becomes_item_list() {
        let page = normalize_page(&json!([{"id": 1}, {"id": 2}]));
        assert_eq!(page.items, vec![json!({"id": 1}), json!({"id": 2})]);
        assert_eq!(page.total, 2);
        assert!(page.page.is_last);
    }

    #[test]
    fn values_envelope_uses_declared_total() {
        let page = normalize_page(&json!({
            "values": [{"id": 1}],
            "total": 40,
            "maxResults": 1,
            "startAt": 0,
            "isLast": false,
            "next": "/folder?startAt=1",
        }));
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 40);
        assert_eq!(page.page.max_results, Some(1));
        assert_eq!(page.page.start_at, Some(0));
        assert!(!page.page.is_last);
        assert_eq!(page.page.next.as_deref(), Some("/folder?startAt=1"));
    }

    #[test]
    fn non_numeric_total_falls_back_to_length() {
        let page = normalize_page(&json!({"values": [{"id": 1}, {"id": 2}], "total": "lots"}));
        assert_eq!(page.total, 2);
    }

    #[test]
    fn single_object_wrapped_as_one_element() {
        let page = normalize_page(&json!({"id": 7, "name": "solo"}));
        assert_eq!(page.total, 1);
        assert_eq!(page.items, vec![json!({"id": 7, "name": "solo"})]);
    }

    #[test]
    fn scalar_and_null_normalize_to_empty() {
        assert_eq!(normalize_page(&json!(null)), NormalizedPage::empty());
        assert_eq!(normalize_page(&json!(42)), NormalizedPage::empty());
        assert_eq!(normalize_page(&json!("text")), NormalizedPage::empty());
    }

    #[test]
    fn absent_pagination_means_complete_result() {
        let page = normalize_page(&json!({"values": []}));
        assert!(page.page.is_last);
        assert_eq!(page.page.next, None);
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = vec![
            json!({"values": [{"id": 1}], "total": 1}),
            json!([{"id": 1}, {"id": 2}]),
            json!({"id": 9}),
            json!({"values": [{"id": 3}], "total": 80, "isLast": false, "startAt": 0}),
            json!(null),
        ];
        for raw in inputs {
            let once = normalize_page(&raw);
            let twice = normalize_page(&once.clone().into_value());
            assert_eq!(once, twice, "re-normalizing changed the envelope for {raw}");
        }
    }
}
