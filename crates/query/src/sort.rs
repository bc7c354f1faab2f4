use std::cmp::Ordering;

use crate::document::{Document, get_path};
use crate::value::compare;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One sort key; `-field` means descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Newest first: the order used when no `sort` parameter is given.
    pub fn default_order() -> Vec<SortKey> {
        vec![SortKey::desc("createdAt")]
    }

    /// Parse a comma-separated list, keeping the given order.
    pub fn parse_list(raw: &str) -> Vec<SortKey> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| match s.strip_prefix('-') {
                Some("") => None,
                Some(field) => Some(SortKey::desc(field)),
                None => Some(SortKey::asc(s.strip_prefix('+').unwrap_or(s))),
            })
            .collect()
    }
}

/// Compare two documents by a key list; earlier keys take precedence.
pub fn compare_documents(a: &Document, b: &Document, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ord = compare(get_path(a, &key.field), get_path(b, &key.field));
        let ord = match key.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_directions_in_order() {
        assert_eq!(
            SortKey::parse_list("-averageCost, name,,-"),
            vec![SortKey::desc("averageCost"), SortKey::asc("name")]
        );
    }

    #[test]
    fn earlier_keys_win() {
        let keys = SortKey::parse_list("housing,-averageCost");
        let a = json!({"housing": false, "averageCost": 10}).as_object().cloned().unwrap();
        let b = json!({"housing": false, "averageCost": 20}).as_object().cloned().unwrap();
        let c = json!({"housing": true, "averageCost": 99}).as_object().cloned().unwrap();

        let mut docs = vec![c.clone(), a.clone(), b.clone()];
        docs.sort_by(|x, y| compare_documents(x, y, &keys));
        assert_eq!(docs, vec![b, a, c]);
    }
}
