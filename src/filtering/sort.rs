use sea_orm::{
    ActiveEnum, ColumnTrait, EntityTrait, IntoSimpleExpr, QueryOrder, Select,
    sea_query::{CaseStatement, Order, SimpleExpr},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::conditions::QueryFilter;
use super::spec::FilterArg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything but a case-insensitive `desc` sorts ascending.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// A requested ordering: a logical field name and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDirective {
    pub field: String,
    pub direction: SortDirection,
}

impl SortDirective {
    #[must_use]
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// How an allow-listed sort field is ordered.
#[derive(Debug, Clone)]
pub enum SortKey<C: ColumnTrait> {
    /// Plain column ordering.
    Column(C),
    /// Order by the position of the column's value in a fixed sequence.
    Ranked(C, Vec<String>),
}

impl<C: ColumnTrait> SortKey<C> {
    /// Rank by the declaration order of an `ActiveEnum`.
    #[must_use]
    pub fn ranked_by<T>(column: C) -> Self
    where
        T: ActiveEnum<Value = String>,
    {
        Self::Ranked(column, T::values())
    }

    fn order_expr(&self) -> SimpleExpr {
        match self {
            Self::Column(column) => (*column).into_simple_expr(),
            Self::Ranked(column, sequence) => rank_expr(*column, sequence),
        }
    }
}

/// `CASE WHEN col = s0 THEN 0 WHEN col = s1 THEN 1 ... ELSE n END`.
///
/// Values outside `sequence` rank after every listed value.
#[must_use]
pub fn rank_expr<C: ColumnTrait>(column: C, sequence: &[String]) -> SimpleExpr {
    let mut case = CaseStatement::new();
    let mut rank: i32 = 0;
    for value in sequence {
        case = case.case(column.eq(value.as_str()), rank);
        rank += 1;
    }
    case.finally(rank).into()
}

/// Append `directive` to `query` if its field is in `sortable`.
/// Unknown fields leave the query untouched.
pub fn apply_sort<E, C>(
    query: Select<E>,
    sortable: &[(&str, SortKey<C>)],
    directive: &SortDirective,
) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    match sortable.iter().find(|(name, _)| *name == directive.field) {
        Some((_, key)) => query.order_by(key.order_expr(), directive.direction.into()),
        None => {
            tracing::debug!(field = %directive.field, "ignoring unsortable field");
            query
        }
    }
}

/// A filter whose entity exposes an allow-list of sort keys.
pub trait SortableFilter: QueryFilter {
    fn sortable_columns() -> Vec<(&'static str, SortKey<<Self::Entity as EntityTrait>::Column>)>;

    fn sort_by(query: Select<Self::Entity>, directive: &SortDirective) -> Select<Self::Entity> {
        apply_sort(query, &Self::sortable_columns(), directive)
    }
}

fn sort_with<F: SortableFilter>(
    query: Select<F::Entity>,
    arg: &FilterArg,
    direction: SortDirection,
) -> Select<F::Entity> {
    arg.values()
        .into_iter()
        .fold(query, |query, field| F::sort_by(query, &SortDirective::new(field, direction)))
}

/// Handler for `sortByAsc`; a list sorts by each field in turn.
pub fn sort_by_asc<F: SortableFilter>(_filter: &F, query: Select<F::Entity>, arg: &FilterArg) -> Select<F::Entity> {
    sort_with::<F>(query, arg, SortDirection::Asc)
}

/// Handler for `sortByDesc`; a list sorts by each field in turn.
pub fn sort_by_desc<F: SortableFilter>(_filter: &F, query: Select<F::Entity>, arg: &FilterArg) -> Select<F::Entity> {
    sort_with::<F>(query, arg, SortDirection::Desc)
}
