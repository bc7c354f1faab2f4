use crate::document::{Document, ID_FIELD, get_path, remove_path, set_path};

/// Field selection applied to returned records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Keep only these paths (plus `_id`).
    Include(Vec<String>),
    /// Drop these paths.
    Exclude(Vec<String>),
}

impl Projection {
    /// Parse `select=name,description` or `select=-description`.
    ///
    /// Any plain field makes the selection inclusive; `-field` entries are then
    /// ignored except `-_id`.
    pub fn parse(raw: &str) -> Option<Self> {
        let fields: Vec<&str> = raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
        if fields.is_empty() {
            return None;
        }

        let (excluded, included): (Vec<&str>, Vec<&str>) = fields.into_iter().partition(|f| f.starts_with('-'));
        if included.is_empty() {
            let excluded = excluded
                .into_iter()
                .filter_map(|f| f.strip_prefix('-'))
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>();
            return (!excluded.is_empty()).then_some(Projection::Exclude(excluded));
        }

        let mut included: Vec<String> = included.into_iter().map(str::to_string).collect();
        if !excluded.contains(&"-_id") && !included.iter().any(|f| f == ID_FIELD) {
            included.insert(0, ID_FIELD.to_string());
        }
        Some(Projection::Include(included))
    }

    pub fn apply(&self, doc: &Document) -> Document {
        match self {
            Projection::Include(fields) => {
                let mut out = Document::new();
                for field in fields {
                    if let Some(value) = get_path(doc, field) {
                        set_path(&mut out, field, value.clone());
                    }
                }
                out
            }
            Projection::Exclude(fields) => {
                let mut out = doc.clone();
                for field in fields {
                    remove_path(&mut out, field);
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn doc() -> Document {
        json!({
            "_id": "1",
            "name": "Devworks",
            "description": "Full stack",
            "location": {"state": "MA", "city": "Boston"}
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn inclusion_keeps_id_and_listed_fields() {
        let p = Projection::parse("name,location.state").unwrap();
        assert_eq!(
            Value::Object(p.apply(&doc())),
            json!({"_id": "1", "name": "Devworks", "location": {"state": "MA"}})
        );
    }

    #[test]
    fn inclusion_can_drop_id_explicitly() {
        let p = Projection::parse("name,-_id").unwrap();
        assert_eq!(Value::Object(p.apply(&doc())), json!({"name": "Devworks"}));
    }

    #[test]
    fn exclusion_removes_listed_fields() {
        let p = Projection::parse("-description,-location").unwrap();
        assert_eq!(Value::Object(p.apply(&doc())), json!({"_id": "1", "name": "Devworks"}));
    }

    #[test]
    fn blank_selection_is_no_projection() {
        assert_eq!(Projection::parse(" , "), None);
    }
}
