//! Ordering and casting of JSON values.
//!
//! Request parameters are strings; stored fields are typed. A parameter is cast
//! to the type of the stored value it is compared with, the way a schema-aware
//! store casts query values.

use std::cmp::Ordering;

use serde_json::Value;

/// Cast a raw parameter to the JSON type of `target`.
///
/// Returns `None` when the raw text cannot represent a value of that type.
pub fn cast_like(raw: &str, target: &Value) -> Option<Value> {
    match target {
        Value::Number(_) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        Value::Bool(_) => match raw {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        Value::String(_) => Some(Value::String(raw.to_string())),
        Value::Null => (raw == "null").then_some(Value::Null),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Total order over optional JSON values used for sorting.
///
/// Missing and null sort first, then numbers, strings, objects, arrays and booleans.
pub fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Array(x)), Some(Value::Array(y))) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = compare(Some(l), Some(r));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Some(Value::Object(x)), Some(Value::Object(y))) => {
            for ((lk, lv), (rk, rv)) in x.iter().zip(y.iter()) {
                let ord = lk.cmp(rk).then_with(|| compare(Some(lv), Some(rv)));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => Ordering::Equal,
    }
}

/// Compare a stored scalar with a raw parameter cast to its type.
///
/// `None` when the parameter cannot be cast (the pair never matches).
pub fn compare_raw(stored: &Value, raw: &str) -> Option<Ordering> {
    let cast = cast_like(raw, stored)?;
    Some(compare(Some(stored), Some(&cast)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn casts_follow_the_stored_type() {
        assert_eq!(cast_like("1000", &json!(5)), Some(json!(1000.0)));
        assert_eq!(cast_like("abc", &json!(5)), None);
        assert_eq!(cast_like("true", &json!(false)), Some(json!(true)));
        assert_eq!(cast_like("yes", &json!(false)), None);
        assert_eq!(cast_like("02118", &json!("x")), Some(json!("02118")));
    }

    #[test]
    fn numbers_compare_numerically_not_lexically() {
        assert_eq!(compare_raw(&json!(900), "1000"), Some(Ordering::Less));
        assert_eq!(compare_raw(&json!(10000), "9000"), Some(Ordering::Greater));
        assert_eq!(compare_raw(&json!(12.5), "12.5"), Some(Ordering::Equal));
    }

    #[test]
    fn missing_sorts_before_everything() {
        assert_eq!(compare(None, Some(&json!(0))), Ordering::Less);
        assert_eq!(compare(Some(&json!("a")), Some(&json!(1))), Ordering::Greater);
        assert_eq!(compare(None, Some(&Value::Null)), Ordering::Equal);
    }
}
