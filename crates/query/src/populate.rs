/// Fixed per-route instruction to join related records into results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Populate {
    /// Replace the reference stored at `path` with the referenced record,
    /// projected to `select` (`_id` always kept).
    Reference {
        path: String,
        collection: String,
        select: Vec<String>,
    },
    /// Attach, under `path`, every record of `collection` whose
    /// `foreign_field` references this record.
    Virtual {
        path: String,
        collection: String,
        foreign_field: String,
    },
}

impl Populate {
    pub fn reference(path: &str, collection: &str, select: &[&str]) -> Self {
        Populate::Reference {
            path: path.to_string(),
            collection: collection.to_string(),
            select: select.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn virtual_field(path: &str, collection: &str, foreign_field: &str) -> Self {
        Populate::Virtual {
            path: path.to_string(),
            collection: collection.to_string(),
            foreign_field: foreign_field.to_string(),
        }
    }

    /// Name of the field this directive writes.
    pub fn path(&self) -> &str {
        match self {
            Populate::Reference { path, .. } | Populate::Virtual { path, .. } => path,
        }
    }
}
