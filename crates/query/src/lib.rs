//! `devcamper-query`: the list query model.
//!
//! Turns a request's raw query parameters into a typed [`QuerySpec`]
//! (filter, projection, sort, page window, population) and provides the pure
//! pieces needed to evaluate it: document path access, value ordering, filter
//! matching, projection and pagination math. Execution against a store lives
//! in `devcamper-infra`.

pub mod document;
pub mod error;
pub mod filter;
pub mod page;
pub mod params;
pub mod populate;
pub mod projection;
pub mod sort;
pub mod spec;
pub mod value;

pub use document::{Document, ID_FIELD};
pub use error::QueryError;
pub use filter::{Condition, Filter, FilterValue, Operator};
pub use page::{Cursor, PageRequest, Paginated, Pagination};
pub use params::{ParamValue, QueryParams};
pub use populate::Populate;
pub use projection::Projection;
pub use sort::{SortDirection, SortKey};
pub use spec::QuerySpec;
