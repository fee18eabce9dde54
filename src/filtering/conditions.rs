use heck::ToLowerCamelCase;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter as _, Select};

use super::search::build_like_condition;
use super::spec::{FilterArg, FilterSpec};

/// A handler bound to one filter key. It receives the filter itself (for
/// request context such as the current user), the query and the argument.
pub type FilterHandler<F> = fn(
    &F,
    Select<<F as QueryFilter>::Entity>,
    &FilterArg,
) -> Select<<F as QueryFilter>::Entity>;

/// Maps request parameters onto per-entity handler functions.
///
/// Implementors only declare their handler table; [`QueryFilter::apply`]
/// takes care of key normalization and dispatch.
pub trait QueryFilter: Sized {
    type Entity: EntityTrait;

    /// Handler table keyed by lowerCamelCase parameter name.
    fn handlers() -> Vec<(&'static str, FilterHandler<Self>)>;

    /// Run every handler whose name matches a key of `spec`, in insertion order.
    /// Keys without a handler are skipped.
    fn apply(&self, query: Select<Self::Entity>, spec: &FilterSpec) -> Select<Self::Entity> {
        let handlers = Self::handlers();
        spec.iter().fold(query, |query, (key, arg)| {
            let name = handler_name(key);
            match handlers.iter().find(|(handler, _)| *handler == name) {
                Some((_, handler)) => {
                    tracing::trace!(key = %key, handler = %name, "applying filter");
                    handler(self, query, arg)
                }
                None => {
                    tracing::debug!(key = %key, "no filter handler, skipping");
                    query
                }
            }
        })
    }
}

/// `archive_status` -> `archiveStatus`; already camelCased keys are unchanged.
#[must_use]
pub fn handler_name(key: &str) -> String {
    key.to_lower_camel_case()
}

/// Equality for a scalar, `IN` for a list, nothing for a flag.
pub fn where_eq_or_in<E, C>(query: Select<E>, column: C, arg: &FilterArg) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    match arg {
        FilterArg::Flag => query,
        FilterArg::Scalar(value) => query.filter(column.eq(value.as_str())),
        FilterArg::List(values) => query.filter(column.is_in(values.iter().map(String::as_str))),
    }
}

/// Equality against an integer id. Non-numeric or missing values are a no-op.
pub fn where_id<E, C>(query: Select<E>, column: C, arg: &FilterArg) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    match arg.as_id() {
        Some(id) => query.filter(column.eq(id)),
        None => {
            tracing::debug!(column = ?column, "ignoring non-numeric id filter");
            query
        }
    }
}

/// Substring search with escaped wildcards. Flags and empty values are a no-op.
pub fn where_like<E, C>(query: Select<E>, column: C, arg: &FilterArg) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    match arg.as_str().and_then(|value| build_like_condition(column, value)) {
        Some(condition) => query.filter(condition),
        None => query,
    }
}
