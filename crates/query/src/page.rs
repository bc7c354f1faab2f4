//! Page windows and pagination cursors.

use serde::{Deserialize, Serialize};

/// Requested page window. Both values are at least 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub const DEFAULT_PAGE: u64 = 1;
    pub const DEFAULT_LIMIT: u64 = 25;

    /// Build from raw parameters; anything that is not a positive integer falls
    /// back to the default rather than failing.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: page.and_then(parse_positive).unwrap_or(Self::DEFAULT_PAGE),
            limit: limit.and_then(parse_positive).unwrap_or(Self::DEFAULT_LIMIT),
        }
    }

    /// `(page - 1) * limit`: records skipped before this page.
    pub fn start_index(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `page * limit`: exclusive end of this page's window.
    pub fn end_index(&self) -> u64 {
        self.page.saturating_mul(self.limit)
    }

    /// Cursors for a result set of `total` matching records.
    pub fn pagination(&self, total: u64) -> Pagination {
        Pagination {
            next: (self.end_index() < total).then(|| Cursor {
                page: self.page + 1,
                limit: self.limit,
            }),
            prev: (self.start_index() > 0).then(|| Cursor {
                page: self.page - 1,
                limit: self.limit,
            }),
        }
    }
}

/// Leading-digit integer parse: `"3"` and `"3rd"` give 3; `"0"`, `"-2"`, `"abc"` give nothing.
fn parse_positive(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let digits_end = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..digits_end].parse::<u64>().ok().filter(|n| *n > 0)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Cursor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<Cursor>,
}

/// One page of a list result, in response-envelope shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub success: bool,
    /// Number of records on this page.
    pub count: usize,
    /// Records matching the filter across all pages (not serialized).
    #[serde(skip)]
    pub total: u64,
    pub pagination: Pagination,
    pub data: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: u64, page: &PageRequest) -> Self {
        Self {
            success: true,
            count: data.len(),
            total,
            pagination: page.pagination(total),
            data,
        }
    }
}
