use axum::http::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use utoipa::ToSchema;

/// A normalized page request: `page >= 1` and `1 <= per_page <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Normalize raw request values.
    ///
    /// A missing or non-positive `per_page` falls back to `default_per_page`,
    /// anything above `max_per_page` is clamped, and a page below 1 becomes 1.
    #[must_use]
    pub fn new(page: Option<i64>, per_page: Option<i64>, default_per_page: u64, max_per_page: u64) -> Self {
        let max_per_page = max_per_page.max(1);
        let per_page = match per_page {
            Some(value) if value > 0 => u64::try_from(value).unwrap_or(max_per_page),
            _ => default_per_page,
        }
        .clamp(1, max_per_page);
        let page = page
            .and_then(|value| u64::try_from(value).ok())
            .filter(|value| *value >= 1)
            .unwrap_or(1);
        Self { page, per_page }
    }

    /// Rows to skip: `(page - 1) * per_page`.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// One page of results plus pagination metadata.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            last_page: total.div_ceil(request.per_page.max(1)).max(1),
        }
    }

    #[must_use]
    pub fn has_more_pages(&self) -> bool {
        self.page < self.last_page
    }

    /// `Content-Range` header describing this page.
    #[must_use]
    pub fn content_range(&self, resource_name: &str) -> HeaderMap {
        let offset = self.page.saturating_sub(1).saturating_mul(self.per_page);
        calculate_content_range(offset, self.items.len() as u64, self.total, resource_name)
    }
}

/// Drop non-ASCII and control characters so the name is a valid header value.
fn sanitize_resource_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii() && !c.is_ascii_control()).collect()
}

/// Build `Content-Range: <resource> <first>-<last>/<total>` for `count` rows
/// starting at `offset`. An empty page reports `<offset>-<offset>`.
#[must_use]
pub fn calculate_content_range(offset: u64, count: u64, total_count: u64, resource_name: &str) -> HeaderMap {
    let last = offset.saturating_add(count.max(1) - 1);
    let safe_name = sanitize_resource_name(resource_name);

    let mut headers = HeaderMap::new();
    let value = format!("{safe_name} {offset}-{last}/{total_count}")
        .parse::<HeaderValue>()
        .or_else(|_| format!("items {offset}-{last}/{total_count}").parse::<HeaderValue>());
    match value {
        Ok(value) => {
            headers.insert("Content-Range", value);
        }
        Err(e) => tracing::warn!(error = %e, "could not build Content-Range header"),
    }
    headers
}
