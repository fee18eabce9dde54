//! # issuedesk
//!
//! List, filter and respond for an office issue tracker built on Axum and
//! Sea-ORM.
//!
//! - [`filtering`]: request parameters to scoped, sorted, paginated queries
//! - [`listing`]: the paginated query façade every list endpoint uses
//! - [`response`]: the `{status, entity, message, metadata}` envelope
//! - [`resources`]: entities (issues, users, offices, ...) and their filters
//!
//! ```rust,ignore
//! async fn list_issues(
//!     State(db): State<DatabaseConnection>,
//!     Query(params): Query<ListParams>,
//!     spec: FilterSpec,
//!     mut envelope: ResponseEnvelope,
//! ) -> Result<ResponseEnvelope, ApiError> {
//!     let request = params.page_request(&ListConfig::default(), IssueFilter::RESOURCE_NAME_PLURAL);
//!     let page = IssueFilter::new().get_list(&db, &spec, request).await?;
//!     envelope.set_status(true).try_add_entity(&page).map_err(|e| ApiError::internal("Serialization failed", Some(e.to_string())))?;
//!     Ok(envelope)
//! }
//! ```

pub mod config;
pub mod errors;
pub mod filtering;
pub mod listing;
pub mod models;
pub mod resources;
pub mod response;

pub use config::ListConfig;
pub use errors::ApiError;
pub use filtering::{FilterArg, FilterSpec, Page, PageRequest, QueryFilter, SortDirection, SortDirective};
pub use listing::ListResource;
pub use models::ListParams;
pub use response::ResponseEnvelope;
