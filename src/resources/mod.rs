//! Sea-ORM entities of the issue tracker together with the filter that
//! serves each entity's list endpoint.

pub mod attachment;
pub mod category;
pub mod executor;
pub mod issue;
pub mod office;
pub mod post;
pub mod role;
pub mod role_user;
pub mod statistic;
pub mod user;

pub use category::CategoryFilter;
pub use executor::ExecutorFilter;
pub use issue::{ArchiveScope, IssueFilter, IssueListItem};
pub use office::OfficeFilter;
pub use post::PostFilter;
pub use role::RoleFilter;
pub use user::UserFilter;
