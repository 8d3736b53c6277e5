use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::core::metrics;
use crate::repositories::StoreError;
use crate::services::pagination::{PageRequest, PageResult, SortOrder};

/// Raw paging query values. Kept as strings so garbage degrades to the
/// defaults instead of rejecting the request. Extracted alongside each
/// endpoint's own filter query.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageParams {
    #[serde(default)]
    limit: Option<String>,
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    sort: Option<String>,
}

impl PageParams {
    pub(crate) fn request(&self) -> PageRequest {
        PageRequest::from_raw(self.limit.as_deref(), self.page.as_deref())
    }

    pub(crate) fn sort_order(&self) -> Result<SortOrder, ApiError> {
        match self.sort.as_deref().filter(|value| !value.is_empty()) {
            None => Ok(SortOrder::default()),
            Some(raw) => SortOrder::parse(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("Unsupported sort order: {raw}"))),
        }
    }
}

/// Maps a listing outcome to the response, recording how many items went out.
pub(crate) fn served<T, U>(
    collection: &'static str,
    result: Result<PageResult<T>, StoreError>,
    to_response: impl FnMut(T) -> U,
) -> Result<PageResult<U>, ApiError> {
    let page = result.map_err(|err| ApiError::listing(err, collection))?;
    metrics::record_page_served(collection, page.items.len());
    Ok(page.map(to_response))
}
