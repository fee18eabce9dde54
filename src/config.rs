use std::collections::HashMap;

use serde::Deserialize;

use crate::filtering::PageRequest;

const DEFAULT_PER_PAGE: u64 = 15;
const MAX_PER_PAGE: u64 = 100;

/// Paging limits for list endpoints.
///
/// ```json
/// { "default_per_page": 15, "max_per_page": 100, "per_resource": { "issues": 20 } }
/// ```
///
/// Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub default_per_page: u64,
    pub max_per_page: u64,
    /// Default page size per resource (plural name), overriding `default_per_page`.
    pub per_resource: HashMap<String, u64>,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
            per_resource: HashMap::new(),
        }
    }
}

impl ListConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns the parse error for malformed JSON or wrongly typed fields.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>, per_page: u64) -> Self {
        self.per_resource.insert(resource.into(), per_page);
        self
    }

    /// Default page size for `resource`. Zero overrides are ignored.
    #[must_use]
    pub fn per_page_for(&self, resource: &str) -> u64 {
        self.per_resource
            .get(resource)
            .copied()
            .filter(|per_page| *per_page > 0)
            .unwrap_or(self.default_per_page)
    }

    /// Normalize raw request values for `resource`.
    #[must_use]
    pub fn page_request(&self, resource: &str, page: Option<i64>, per_page: Option<i64>) -> PageRequest {
        PageRequest::new(page, per_page, self.per_page_for(resource), self.max_per_page)
    }
}
