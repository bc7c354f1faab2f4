//! Schemaless record representation and dotted-path access.

use serde_json::{Map, Value};

use devcamper_core::RecordId;

/// A persisted record: a JSON object whose `_id` holds its [`RecordId`].
pub type Document = Map<String, Value>;

/// Key under which every document stores its identifier.
pub const ID_FIELD: &str = "_id";

/// Resolve a dotted path (`location.state`) inside a document.
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Write `value` at a dotted path, creating intermediate objects as needed.
///
/// A non-object intermediate value is replaced by an object.
pub fn set_path(doc: &mut Document, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            doc.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = doc
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(inner) = slot {
                set_path(inner, rest, value);
            }
        }
    }
}

/// Remove the value at a dotted path, returning it.
pub fn remove_path(doc: &mut Document, path: &str) -> Option<Value> {
    match path.split_once('.') {
        None => doc.remove(path),
        Some((head, rest)) => match doc.get_mut(head)? {
            Value::Object(inner) => remove_path(inner, rest),
            _ => None,
        },
    }
}

/// The document's identifier, if present and well-formed.
pub fn record_id(doc: &Document) -> Option<RecordId> {
    doc.get(ID_FIELD)?.as_str()?.parse().ok()
}

/// Read a reference field holding another record's id.
pub fn reference(doc: &Document, path: &str) -> Option<RecordId> {
    get_path(doc, path)?.as_str()?.parse().ok()
}
