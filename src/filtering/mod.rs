//! # Filtering, sorting and paging
//!
//! Turns request parameters into scoped, composed Sea-ORM queries.
//!
//! A request's parameters are collected into a [`FilterSpec`]. Each
//! resource defines a filter type implementing [`QueryFilter`], whose
//! handler table maps lowerCamelCase names to functions. Applying a filter
//! converts every key (`archive_status` -> `archiveStatus`) and calls the
//! matching handler; keys without a handler are skipped.
//!
//! ```rust,ignore
//! // GET /issues?status[]=pending&status[]=in+progress&sort_by_asc=priority
//! let spec = FilterSpec::from_query("status[]=pending&status[]=in+progress&sort_by_asc=priority");
//! let query = IssueFilter::default().apply(issue::Entity::find(), &spec);
//! ```
//!
//! Substring filters go through [`build_like_condition`], which escapes `\`,
//! `%` and `_` and binds the pattern. Enum columns sort by their declared
//! rank through a `CASE WHEN` expression ([`rank_expr`]).

pub mod conditions;
pub mod pagination;
pub mod search;
pub mod sort;
pub mod spec;

pub use conditions::{FilterHandler, QueryFilter, handler_name, where_eq_or_in, where_id, where_like};
pub use pagination::{Page, PageRequest, calculate_content_range};
pub use search::{MAX_SEARCH_VALUE_LENGTH, build_like_condition, escape_like_wildcards};
pub use sort::{SortDirection, SortDirective, SortKey, SortableFilter, apply_sort, rank_expr, sort_by_asc, sort_by_desc};
pub use spec::{FilterArg, FilterSpec};
