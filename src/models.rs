use serde::Deserialize;
use serde_with::{DefaultOnError, NoneAsEmptyString, serde_as};
use utoipa::{IntoParams, ToSchema};

use crate::config::ListConfig;
use crate::filtering::{FilterSpec, PageRequest};

/// Paging parameters shared by every list endpoint.
///
/// Field filters travel next to these as plain query parameters
/// (`?status[]=pending&title=lamp`) and are read with the
/// [`FilterSpec`] extractor. Clients that prefer a single parameter can
/// send them JSON-encoded in `filter` instead.
///
/// # Pagination
/// `page` is 1-based. A missing, zero or negative `per_page` uses the
/// resource's configured default; values above the configured maximum are
/// clamped. Empty or unparseable numbers are read as missing rather than
/// failing the request.
#[serde_as]
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Page number (1-based).
    ///
    /// Example: `1`
    #[param(example = 1)]
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError<NoneAsEmptyString>")]
    pub page: Option<i64>,
    /// Number of items per page.
    ///
    /// Example: `15`
    #[param(example = 15)]
    #[serde(default, alias = "perPage")]
    #[serde_as(deserialize_as = "DefaultOnError<NoneAsEmptyString>")]
    pub per_page: Option<i64>,
    /// JSON-encoded field filters.
    ///
    /// Example: `{"status": ["pending", "in progress"], "sort_by_asc": "due_date"}`
    #[param(example = json!({"status": ["pending", "in progress"], "sort_by_asc": "due_date"}))]
    pub filter: Option<String>,
}

impl ListParams {
    #[must_use]
    pub fn page_request(&self, config: &ListConfig, resource: &str) -> PageRequest {
        config.page_request(resource, self.page, self.per_page)
    }

    /// Filters from the JSON `filter` parameter; invalid JSON yields none.
    #[must_use]
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec::from_filter_json(self.filter.as_deref())
    }
}
