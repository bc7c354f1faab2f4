//! Raw request parameters.
//!
//! `averageCost[gte]=1000&careers[in]=Business,Other&sort=-name` becomes
//!
//! ```text
//! averageCost -> Operators { gte: "1000" }
//! careers     -> Operators { in: "Business,Other" }
//! sort        -> Scalar("-name")
//! ```
//!
//! A repeated key keeps its last value, and keys or sub-keys beginning with `$`
//! are dropped so raw store operators can never be injected.

use std::collections::BTreeMap;

/// Value of one parameter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Scalar(String),
    /// Bracketed sub-keys, e.g. `field[gte]=1` → `{"gte": "1"}`.
    Operators(BTreeMap<String, String>),
}

impl ParamValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ParamValue::Scalar(s) => Some(s),
            ParamValue::Operators(_) => None,
        }
    }
}

/// Parsed parameter mapping, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: BTreeMap<String, ParamValue>,
}

impl QueryParams {
    /// Parse a raw (still percent-encoded) query string.
    pub fn parse(raw: &str) -> Self {
        Self::from_pairs(url::form_urlencoded::parse(raw.as_bytes()))
    }

    /// Build from decoded key/value pairs in request order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            params.insert(key.as_ref(), value.into());
        }
        params
    }

    fn insert(&mut self, key: &str, value: String) {
        let Some((field, sub_key)) = split_key(key) else {
            return;
        };
        if field.is_empty() || field.starts_with('$') {
            return;
        }

        match sub_key {
            None => {
                self.entries.insert(field.to_string(), ParamValue::Scalar(value));
            }
            Some(sub) if sub.is_empty() || sub.starts_with('$') => {}
            Some(sub) => {
                let entry = self
                    .entries
                    .entry(field.to_string())
                    .or_insert_with(|| ParamValue::Operators(BTreeMap::new()));
                match entry {
                    ParamValue::Operators(ops) => {
                        ops.insert(sub.to_string(), value);
                    }
                    // Last write wins across shapes as well.
                    scalar @ ParamValue::Scalar(_) => {
                        *scalar = ParamValue::Operators(BTreeMap::from([(sub.to_string(), value)]));
                    }
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// Scalar value of `key`, ignoring bracketed forms.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_scalar)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the mapping without the given keys.
    pub fn without(&self, keys: &[&str]) -> Self {
        let mut copy = self.clone();
        for key in keys {
            copy.entries.remove(*key);
        }
        copy
    }
}

/// Split `field[sub]` into `("field", Some("sub"))`; `field` into `("field", None)`.
///
/// Keys with more than one bracket pair, or unbalanced brackets, are rejected.
fn split_key(key: &str) -> Option<(&str, Option<&str>)> {
    match key.find('[') {
        None => (!key.contains(']')).then_some((key, None)),
        Some(open) => {
            let rest = &key[open + 1..];
            let sub = rest.strip_suffix(']')?;
            if sub.contains('[') || sub.contains(']') {
                return None;
            }
            Some((&key[..open], Some(sub)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalars_and_bracketed_operators() {
        let params = QueryParams::parse("averageCost%5Bgte%5D=1000&averageCost[lt]=5000&housing=true");

        assert_eq!(params.scalar("housing"), Some("true"));
        match params.get("averageCost") {
            Some(ParamValue::Operators(ops)) => {
                assert_eq!(ops.get("gte").map(String::as_str), Some("1000"));
                assert_eq!(ops.get("lt").map(String::as_str), Some("5000"));
            }
            other => panic!("expected operators, got {other:?}"),
        }
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let params = QueryParams::parse("sort=name&sort=-createdAt");
        assert_eq!(params.scalar("sort"), Some("-createdAt"));
    }

    #[test]
    fn dollar_keys_are_dropped() {
        let params = QueryParams::parse("$where=1&name[$ne]=x&name[gt]=a");
        assert!(params.get("$where").is_none());
        match params.get("name") {
            Some(ParamValue::Operators(ops)) => {
                assert_eq!(ops.len(), 1);
                assert!(ops.contains_key("gt"));
            }
            other => panic!("expected operators, got {other:?}"),
        }
    }

    #[test]
    fn malformed_keys_are_ignored() {
        let params = QueryParams::parse("a[b][c]=1&d]=2&e[=3&=4");
        assert!(params.is_empty());
    }

    #[test]
    fn without_removes_keys_from_a_copy() {
        let params = QueryParams::parse("select=name&page=2&name=x");
        let filter_source = params.without(&["select", "page"]);
        assert_eq!(filter_source.iter().count(), 1);
        assert_eq!(params.iter().count(), 3);
    }

    #[test]
    fn decodes_plus_and_percent_sequences() {
        let params = QueryParams::parse("careers=Web+Development&location.city=New%20York");
        assert_eq!(params.scalar("careers"), Some("Web Development"));
        assert_eq!(params.scalar("location.city"), Some("New York"));
    }
}
