//! Per-user issue counts for the dashboard, grouped by priority, status or
//! category.
//!
//! Each query returns [`StatisticRow`]s; [`as_metadata`] folds them into the
//! `{ "<group>": <count> }` object that list endpoints attach as envelope
//! metadata.

use sea_orm::{
    DatabaseConnection, FromQueryResult, Order, QueryFilter as _, QueryOrder, QuerySelect, Select,
    entity::prelude::*,
    sea_query::{Expr, SimpleExpr},
};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::category;
use super::issue::{self, IssuePriority, IssueStatus};
use crate::filtering::rank_expr;

const ITEM_ALIAS: &str = "item_statistic";
const COUNT_ALIAS: &str = "count";

/// One group and the number of issues in it.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize, ToSchema)]
pub struct StatisticRow {
    pub item_statistic: String,
    pub count: i64,
}

fn owned_by(user_id: i32) -> Select<issue::Entity> {
    issue::Entity::find()
        .select_only()
        .filter(issue::Column::UserId.eq(user_id))
}

fn issue_count() -> SimpleExpr {
    Expr::col((issue::Entity, issue::Column::Id)).count()
}

/// Open issues of `user_id` per priority, in priority rank order. Archived
/// issues are not counted.
///
/// # Errors
///
/// Propagates the `DbErr` of the query.
pub async fn issues_by_priority(db: &DatabaseConnection, user_id: i32) -> Result<Vec<StatisticRow>, DbErr> {
    owned_by(user_id)
        .column_as(issue::Column::Priority, ITEM_ALIAS)
        .column_as(issue_count(), COUNT_ALIAS)
        .filter(issue::Column::Status.ne(IssueStatus::Archive))
        .group_by(issue::Column::Priority)
        .order_by(rank_expr(issue::Column::Priority, &IssuePriority::values()), Order::Asc)
        .into_model::<StatisticRow>()
        .all(db)
        .await
}

/// Issues of `user_id` per status, archived ones included, in status rank
/// order.
///
/// # Errors
///
/// Propagates the `DbErr` of the query.
pub async fn issues_by_status(db: &DatabaseConnection, user_id: i32) -> Result<Vec<StatisticRow>, DbErr> {
    owned_by(user_id)
        .column_as(issue::Column::Status, ITEM_ALIAS)
        .column_as(issue_count(), COUNT_ALIAS)
        .group_by(issue::Column::Status)
        .order_by(rank_expr(issue::Column::Status, &IssueStatus::values()), Order::Asc)
        .into_model::<StatisticRow>()
        .all(db)
        .await
}

/// Issues of `user_id` per category name. Uncategorized issues are left out.
///
/// # Errors
///
/// Propagates the `DbErr` of the query.
pub async fn issues_by_category(db: &DatabaseConnection, user_id: i32) -> Result<Vec<StatisticRow>, DbErr> {
    owned_by(user_id)
        .column_as(category::Column::Name, ITEM_ALIAS)
        .column_as(issue_count(), COUNT_ALIAS)
        .inner_join(category::Entity)
        .group_by(issue::Column::CategoryId)
        .group_by(category::Column::Name)
        .order_by_asc(category::Column::Name)
        .into_model::<StatisticRow>()
        .all(db)
        .await
}

/// `[{item_statistic: "major", count: 2}]` -> `{"major": 2}`, keeping row order.
#[must_use]
pub fn as_metadata(rows: &[StatisticRow]) -> Value {
    Value::Object(
        rows.iter()
            .map(|row| (row.item_statistic.clone(), Value::from(row.count)))
            .collect::<Map<String, Value>>(),
    )
}
