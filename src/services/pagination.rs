//! Page/limit arithmetic shared by every list endpoint.
//!
//! A list request is served in four steps: count the matching rows, build a
//! [`PageState`] from the request and the count, fetch the rows described by
//! [`PageState::to_query_options`], then [`PageState::attach`] them. The
//! [`paginate`] driver runs those steps against any [`PagedSource`].

use serde::Serialize;

use crate::repositories::{PagedSource, StoreError};

pub(crate) const DEFAULT_PAGE_SIZE: i64 = 10;

/// Page size used when a request leaves `limit` unset, plus an optional cap.
/// Without a cap a caller's positive limit is used exactly as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageDefaults {
    default_limit: i64,
    max_limit: Option<i64>,
}

impl PageDefaults {
    pub(crate) fn new(default_limit: i64, max_limit: Option<i64>) -> Self {
        let default_limit = default_limit.max(1);
        Self { default_limit, max_limit: max_limit.map(|max| max.max(default_limit)) }
    }

    pub(crate) fn default_limit(&self) -> i64 {
        self.default_limit
    }

    pub(crate) fn max_limit(&self) -> Option<i64> {
        self.max_limit
    }
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, None)
    }
}

/// Raw paging input. Pages are 1-based; zero in either field means "unset".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PageRequest {
    pub(crate) limit: i64,
    pub(crate) page: i64,
}

impl PageRequest {
    pub(crate) fn new(limit: i64, page: i64) -> Self {
        Self { limit, page }
    }

    /// Absent or unparsable values fall back to zero.
    pub(crate) fn from_raw(limit: Option<&str>, page: Option<&str>) -> Self {
        Self { limit: parse_or_zero(limit), page: parse_or_zero(page) }
    }
}

fn parse_or_zero(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok()).unwrap_or(0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum SortOrder {
    /// Creation order, ties broken by id.
    #[default]
    CreatedAsc,
    CreatedDesc,
}

impl SortOrder {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "created_at" | "+created_at" => Some(Self::CreatedAsc),
            "desc" | "-created_at" => Some(Self::CreatedDesc),
            _ => None,
        }
    }

    pub(crate) fn order_by(self) -> &'static str {
        match self {
            Self::CreatedAsc => "created_at ASC, id ASC",
            Self::CreatedDesc => "created_at DESC, id DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QueryOptions {
    pub(crate) skip: i64,
    pub(crate) limit: i64,
    pub(crate) sort: SortOrder,
}

/// Normalized paging metadata for one request. Consumed by [`PageState::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageState {
    page: i64,
    limit: i64,
    skip: i64,
    total_count: i64,
    total_pages: i64,
    sort: SortOrder,
}

impl PageState {
    pub(crate) fn new(request: PageRequest, total_count: i64, defaults: PageDefaults) -> Self {
        let limit = if request.limit <= 0 {
            defaults.default_limit()
        } else {
            defaults.max_limit().map_or(request.limit, |max| request.limit.min(max))
        };
        let page = request.page.max(1);
        let skip = (page - 1).saturating_mul(limit).max(0);
        let total_count = total_count.max(0);
        let total_pages = if total_count == 0 {
            0
        } else {
            total_count / limit + i64::from(total_count % limit != 0)
        };

        Self { page, limit, skip, total_count, total_pages, sort: SortOrder::default() }
    }

    pub(crate) fn sorted_by(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub(crate) fn page(&self) -> i64 {
        self.page
    }

    pub(crate) fn limit(&self) -> i64 {
        self.limit
    }

    pub(crate) fn skip(&self) -> i64 {
        self.skip
    }

    pub(crate) fn total_count(&self) -> i64 {
        self.total_count
    }

    pub(crate) fn total_pages(&self) -> i64 {
        self.total_pages
    }

    pub(crate) fn to_query_options(&self) -> QueryOptions {
        QueryOptions { skip: self.skip, limit: self.limit, sort: self.sort }
    }

    pub(crate) fn attach<T>(self, mut items: Vec<T>) -> PageResult<T> {
        items.truncate(usize::try_from(self.limit).unwrap_or(usize::MAX));
        PageResult {
            items,
            total_count: self.total_count,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct PageResult<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total_count: i64,
    pub(crate) page: i64,
    pub(crate) limit: i64,
    pub(crate) total_pages: i64,
}

impl<T> PageResult<T> {
    pub(crate) fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

/// Count, then fetch one page. Store errors are returned as-is; nothing is retried.
pub(crate) async fn paginate<S>(
    source: &S,
    filter: &S::Filter,
    request: PageRequest,
    defaults: PageDefaults,
    sort: SortOrder,
) -> Result<PageResult<S::Item>, StoreError>
where
    S: PagedSource + ?Sized,
{
    let total_count = source.count(filter).await?;
    let state = PageState::new(request, total_count, defaults).sorted_by(sort);
    let items = source.query(filter, state.to_query_options()).await?;
    Ok(state.attach(items))
}
