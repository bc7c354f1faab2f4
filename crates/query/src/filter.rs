//! Typed filter expressions.
//!
//! Every non-reserved parameter becomes one or more `{field, operator, value}`
//! conditions; the conditions of a filter are conjunctive. Only the enumerated
//! operator words are recognised, and only in sub-key position, so a field
//! that happens to be called `in` or `lt` stays a plain field.

use std::cmp::Ordering;

use serde_json::Value;

use crate::document::{Document, get_path};
use crate::error::QueryError;
use crate::params::{ParamValue, QueryParams};
use crate::value::compare_raw;

/// Supported comparison operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Operator {
    /// Parse an operator word used as a bracketed sub-key.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "gt" => Some(Operator::Gt),
            "gte" => Some(Operator::Gte),
            "lt" => Some(Operator::Lt),
            "lte" => Some(Operator::Lte),
            "in" => Some(Operator::In),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
        }
    }

    fn accepts(&self, ord: Ordering) -> bool {
        match self {
            Operator::Eq | Operator::In => ord == Ordering::Equal,
            Operator::Gt => ord == Ordering::Greater,
            Operator::Gte => ord != Ordering::Less,
            Operator::Lt => ord == Ordering::Less,
            Operator::Lte => ord != Ordering::Greater,
        }
    }
}

/// Right-hand side of a condition, still in raw (uncast) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Single(String),
    List(Vec<String>),
}

impl FilterValue {
    /// Every raw alternative this value stands for.
    pub fn alternatives(&self) -> &[String] {
        match self {
            FilterValue::Single(s) => std::slice::from_ref(s),
            FilterValue::List(items) => items,
        }
    }
}

/// One `{field, operator, value}` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: FilterValue,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Evaluate against a document.
    ///
    /// Array fields match when any element satisfies the condition. Missing
    /// fields never match.
    pub fn matches(&self, doc: &Document) -> bool {
        match get_path(doc, &self.field) {
            None => false,
            Some(Value::Array(items)) => items.iter().any(|item| self.matches_scalar(item)),
            Some(stored) => self.matches_scalar(stored),
        }
    }

    fn matches_scalar(&self, stored: &Value) -> bool {
        self.value.alternatives().iter().any(|raw| {
            compare_raw(stored, raw).is_some_and(|ord| self.operator.accepts(ord))
        })
    }
}

/// Conjunction of conditions. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Equality on a single field.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::all().and_eq(field, value)
    }

    pub fn and_eq(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.and(Condition::new(field, Operator::Eq, FilterValue::Single(value.into())))
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }

    /// Build a filter from parameters whose reserved keys are already removed.
    ///
    /// `field=value` → equality; `field[op]=value` → `op` for each supported
    /// operator word. `in` takes a comma-separated list.
    pub fn from_params(params: &QueryParams) -> Result<Self, QueryError> {
        let mut filter = Self::all();
        for (field, value) in params.iter() {
            match value {
                ParamValue::Scalar(raw) => {
                    filter = filter.and(Condition::new(field, Operator::Eq, FilterValue::Single(raw.clone())));
                }
                ParamValue::Operators(ops) => {
                    for (word, raw) in ops {
                        let operator = Operator::from_word(word).ok_or_else(|| QueryError::UnsupportedOperator {
                            field: field.to_string(),
                            operator: word.clone(),
                        })?;
                        let value = match operator {
                            Operator::In => FilterValue::List(
                                raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
                            ),
                            _ => FilterValue::Single(raw.clone()),
                        };
                        filter = filter.and(Condition::new(field, operator, value));
                    }
                }
            }
        }
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn filter(query: &str) -> Filter {
        Filter::from_params(&QueryParams::parse(query)).unwrap()
    }

    #[test]
    fn bracketed_words_become_operators() {
        let f = filter("averageCost[gte]=1000&averageCost[lt]=5000");
        assert_eq!(
            f.conditions(),
            &[
                Condition::new("averageCost", Operator::Gte, FilterValue::Single("1000".into())),
                Condition::new("averageCost", Operator::Lt, FilterValue::Single("5000".into())),
            ]
        );
    }

    #[test]
    fn operator_words_as_field_names_stay_fields() {
        let f = filter("in=x&lte=3&title=gt");
        assert!(f.conditions().iter().all(|c| c.operator == Operator::Eq));
        assert!(f.matches(&doc(json!({"in": "x", "lte": 3, "title": "gt"}))));
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let err = Filter::from_params(&QueryParams::parse("name[regex]=^a")).unwrap_err();
        assert_eq!(
            err,
            QueryError::UnsupportedOperator {
                field: "name".into(),
                operator: "regex".into()
            }
        );
    }

    #[test]
    fn in_matches_any_listed_value_and_array_elements() {
        let f = filter("careers[in]=Business,UI/UX");
        assert!(f.matches(&doc(json!({"careers": ["Web Development", "UI/UX"]}))));
        assert!(!f.matches(&doc(json!({"careers": ["Data Science"]}))));
    }

    #[test]
    fn equality_casts_to_stored_type() {
        let f = filter("housing=true&location.state=MA");
        assert!(f.matches(&doc(json!({"housing": true, "location": {"state": "MA"}}))));
        assert!(!f.matches(&doc(json!({"housing": false, "location": {"state": "MA"}}))));
        assert!(!f.matches(&doc(json!({"housing": true}))));
    }

    #[test]
    fn uncastable_values_never_match() {
        let f = filter("averageCost[gt]=cheap");
        assert!(!f.matches(&doc(json!({"averageCost": 100}))));
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::all().matches(&Document::new()));
    }

    fn reference(op: Operator, stored: i64, threshold: i64) -> bool {
        match op {
            Operator::Eq | Operator::In => stored == threshold,
            Operator::Gt => stored > threshold,
            Operator::Gte => stored >= threshold,
            Operator::Lt => stored < threshold,
            Operator::Lte => stored <= threshold,
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a bracketed operator parameter selects exactly the records
        /// a direct comparison against the threshold selects.
        #[test]
        fn translated_operators_agree_with_direct_comparison(
            costs in prop::collection::vec(0i64..20_000, 0..40),
            threshold in 0i64..20_000,
            word in prop::sample::select(vec!["gt", "gte", "lt", "lte", "in"]),
        ) {
            let op = Operator::from_word(word).unwrap();
            let f = filter(&format!("averageCost[{word}]={threshold}"));

            let docs: Vec<Document> = costs.iter().map(|c| doc(json!({"averageCost": c}))).collect();
            let selected: Vec<i64> = docs
                .iter()
                .filter(|d| f.matches(d))
                .map(|d| d["averageCost"].as_i64().unwrap())
                .collect();
            let expected: Vec<i64> = costs.iter().copied().filter(|c| reference(op, *c, threshold)).collect();

            prop_assert_eq!(selected, expected);
        }
    }
}
