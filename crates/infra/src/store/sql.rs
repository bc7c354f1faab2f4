//! Translation of typed queries into SQL over the `documents` JSONB table.
//!
//! Pure string building; the Postgres store binds the collected parameters.

use serde_json::Value;

use devcamper_catalog::UniqueIndex;
use devcamper_query::value::cast_like;
use devcamper_query::{Condition, Filter, Operator, SortDirection, SortKey};

use crate::geo::GeoPoint;

pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    seq BIGSERIAL,
    collection TEXT NOT NULL,
    id UUID NOT NULL,
    body JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (collection, id)
)
"#;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SqlParam {
    Text(String),
    TextArray(Vec<String>),
    Int(i64),
    Float(Option<f64>),
    Bool(Option<bool>),
}

/// Accumulates positional parameters. `$1` is always the collection name.
#[derive(Debug)]
pub(crate) struct SqlBuilder {
    params: Vec<SqlParam>,
}

impl SqlBuilder {
    pub(crate) fn new(collection: &str) -> Self {
        Self {
            params: vec![SqlParam::Text(collection.to_string())],
        }
    }

    pub(crate) fn push(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }

    pub(crate) fn params(&self) -> &[SqlParam] {
        &self.params
    }

    pub(crate) fn into_params(self) -> Vec<SqlParam> {
        self.params
    }
}

fn segments(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
}

fn sql_operator(op: Operator) -> &'static str {
    match op {
        Operator::Eq | Operator::In => "=",
        Operator::Gt => ">",
        Operator::Gte => ">=",
        Operator::Lt => "<",
        Operator::Lte => "<=",
    }
}

/// `WHERE` body for a filter (`TRUE` when empty), scoped to `$1`'s collection.
pub(crate) fn where_clause(b: &mut SqlBuilder, filter: &Filter) -> String {
    let mut parts = vec!["collection = $1".to_string()];
    parts.extend(filter.conditions().iter().map(|c| condition(b, c)));
    parts.join(" AND ")
}

/// Casts each alternative per the stored element's JSON type; array fields
/// match when any element matches.
fn condition(b: &mut SqlBuilder, c: &Condition) -> String {
    let path = b.push(SqlParam::TextArray(segments(&c.field)));
    let op = sql_operator(c.operator);

    let alternatives: Vec<String> = c
        .value
        .alternatives()
        .iter()
        .map(|raw| {
            let number = cast_like(raw, &Value::from(0)).and_then(|v| v.as_f64());
            let boolean = cast_like(raw, &Value::Bool(false)).and_then(|v| v.as_bool());
            let n = b.push(SqlParam::Float(number));
            let s = b.push(SqlParam::Text(raw.clone()));
            let bo = b.push(SqlParam::Bool(boolean));
            format!(
                "CASE jsonb_typeof(v.val) \
                 WHEN 'number' THEN {n}::float8 IS NOT NULL AND (v.val)::float8 {op} {n}::float8 \
                 WHEN 'string' THEN (v.val #>> '{{}}') COLLATE \"C\" {op} {s}::text \
                 WHEN 'boolean' THEN {bo}::boolean IS NOT NULL AND (v.val)::boolean {op} {bo}::boolean \
                 ELSE FALSE END"
            )
        })
        .collect();

    if alternatives.is_empty() {
        return "FALSE".to_string();
    }

    format!(
        "EXISTS (SELECT 1 FROM jsonb_array_elements(CASE WHEN jsonb_typeof(body #> {path}) = 'array' \
         THEN body #> {path} ELSE jsonb_build_array(body #> {path}) END) AS v(val) WHERE {})",
        alternatives.join(" OR ")
    )
}

/// Values of different JSON types order as missing/null, numbers, strings,
/// objects, arrays, booleans; strings compare bytewise. Ties keep insertion order.
pub(crate) fn order_by(b: &mut SqlBuilder, sort: &[SortKey]) -> String {
    let mut keys: Vec<String> = sort
        .iter()
        .map(|key| {
            let path = b.push(SqlParam::TextArray(segments(&key.field)));
            let dir = match key.direction {
                SortDirection::Ascending => "ASC",
                SortDirection::Descending => "DESC",
            };
            let v = format!("body #> {path}");
            format!(
                "CASE jsonb_typeof({v}) WHEN 'number' THEN 1 WHEN 'string' THEN 2 WHEN 'object' THEN 3 \
                 WHEN 'array' THEN 4 WHEN 'boolean' THEN 5 ELSE 0 END {dir}, \
                 CASE WHEN jsonb_typeof({v}) = 'number' THEN ({v})::float8 END {dir}, \
                 (CASE WHEN jsonb_typeof({v}) = 'string' THEN {v} #>> '{{}}' END) COLLATE \"C\" {dir}, \
                 {v} {dir}"
            )
        })
        .collect();
    keys.push("seq ASC".to_string());
    format!("ORDER BY {}", keys.join(", "))
}

/// Haversine test on a `[longitude, latitude]` pair stored at `path`.
pub(crate) fn within_sphere(b: &mut SqlBuilder, path: &str, center: GeoPoint, radius: f64) -> String {
    let mut lng_path = segments(path);
    let mut lat_path = lng_path.clone();
    lng_path.push("0".to_string());
    lat_path.push("1".to_string());

    let lng = b.push(SqlParam::TextArray(lng_path));
    let lat = b.push(SqlParam::TextArray(lat_path));
    let c_lng = b.push(SqlParam::Float(Some(center.longitude)));
    let c_lat = b.push(SqlParam::Float(Some(center.latitude)));
    let r = b.push(SqlParam::Float(Some(radius)));

    format!(
        "collection = $1 AND CASE WHEN jsonb_typeof(body #> {lng}) = 'number' AND jsonb_typeof(body #> {lat}) = 'number' \
         THEN 2 * asin(least(1.0, sqrt(\
         power(sin(radians((body #> {lat})::float8 - {c_lat}::float8) / 2), 2) + \
         cos(radians({c_lat}::float8)) * cos(radians((body #> {lat})::float8)) * \
         power(sin(radians((body #> {lng})::float8 - {c_lng}::float8) / 2), 2)))) <= {r}::float8 \
         ELSE FALSE END"
    )
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Index name and DDL for a unique expression index over JSONB fields.
pub(crate) fn unique_index_ddl(index: &UniqueIndex) -> (String, String) {
    let name: String = format!("documents_{}_{}_key", index.collection, index.fields.join("_"))
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    let exprs = index
        .fields
        .iter()
        .map(|f| format!("(body ->> {})", quote_literal(f)))
        .collect::<Vec<_>>()
        .join(", ");
    let ddl = format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {name} ON documents ({exprs}) WHERE collection = {}",
        quote_literal(index.collection)
    );
    (name, ddl)
}
