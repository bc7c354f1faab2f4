//! Assembly of a complete list query from request parameters.

use crate::error::QueryError;
use crate::filter::Filter;
use crate::page::PageRequest;
use crate::params::QueryParams;
use crate::populate::Populate;
use crate::projection::Projection;
use crate::sort::SortKey;

/// Everything needed to run one list request against a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub filter: Filter,
    pub projection: Option<Projection>,
    pub sort: Vec<SortKey>,
    pub page: PageRequest,
    pub populate: Option<Populate>,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            filter: Filter::all(),
            projection: None,
            sort: SortKey::default_order(),
            page: PageRequest::default(),
            populate: None,
        }
    }
}

impl QuerySpec {
    /// Parameter names that control the query rather than filter it.
    pub const RESERVED: [&'static str; 4] = ["select", "sort", "page", "limit"];

    pub fn from_params(params: &QueryParams) -> Result<Self, QueryError> {
        let filter = Filter::from_params(&params.without(&Self::RESERVED))?;

        let projection = params.scalar("select").and_then(Projection::parse);

        let sort = params
            .scalar("sort")
            .map(SortKey::parse_list)
            .filter(|keys| !keys.is_empty())
            .unwrap_or_else(SortKey::default_order);

        let page = PageRequest::from_raw(params.scalar("page"), params.scalar("limit"));

        Ok(Self {
            filter,
            projection,
            sort,
            page,
            populate: None,
        })
    }

    /// Attach the route's population directive.
    pub fn with_populate(mut self, populate: Option<Populate>) -> Self {
        self.populate = populate;
        self
    }
}
