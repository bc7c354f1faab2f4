//! Success envelopes.

use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};

/// `{ "success": true, "data": ... }`
pub fn data(value: impl Serialize) -> Json<Value> {
    Json(json!({ "success": true, "data": value }))
}

/// `{ "success": true, "count": n, "data": [...] }`
pub fn with_count<T: Serialize>(items: Vec<T>) -> Json<Value> {
    Json(json!({ "success": true, "count": items.len(), "data": items }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelopes_have_the_expected_shape() {
        assert_eq!(data("done").0, json!({ "success": true, "data": "done" }));
        assert_eq!(
            with_count(vec![1, 2]).0,
            json!({ "success": true, "count": 2, "data": [1, 2] })
        );
    }
}
