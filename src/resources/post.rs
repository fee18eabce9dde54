use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::filtering::{FilterArg, FilterHandler, QueryFilter, where_like};
use crate::listing::ListResource;

/// Internal news feed entry.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "posts")]
#[schema(as = Post)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, Default)]
pub struct PostFilter;

fn title(_: &PostFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_like(query, Column::Title, arg)
}

fn description(_: &PostFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_like(query, Column::Description, arg)
}

impl QueryFilter for PostFilter {
    type Entity = Entity;

    fn handlers() -> Vec<(&'static str, FilterHandler<Self>)> {
        vec![
            ("title", title as FilterHandler<Self>),
            ("description", description as FilterHandler<Self>),
        ]
    }
}

impl ListResource for PostFilter {
    type Item = Model;

    const RESOURCE_NAME_PLURAL: &'static str = "posts";
    const ID_COLUMN: Column = Column::Id;

    fn default_order(query: Select<Entity>) -> Select<Entity> {
        query.order_by_desc(Column::CreatedAt)
    }
}
