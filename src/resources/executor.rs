use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::filtering::{FilterArg, FilterHandler, QueryFilter, where_like};
use crate::listing::ListResource;

/// Person or contractor issues are assigned to.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "executors")]
#[schema(as = Executor)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::issue::Entity")]
    Issue,
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutorFilter;

fn name(_: &ExecutorFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_like(query, Column::Name, arg)
}

fn email(_: &ExecutorFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_like(query, Column::Email, arg)
}

impl QueryFilter for ExecutorFilter {
    type Entity = Entity;

    fn handlers() -> Vec<(&'static str, FilterHandler<Self>)> {
        vec![
            ("name", name as FilterHandler<Self>),
            ("email", email as FilterHandler<Self>),
        ]
    }
}

impl ListResource for ExecutorFilter {
    type Item = Model;

    const RESOURCE_NAME_PLURAL: &'static str = "executors";
    const ID_COLUMN: Column = Column::Id;

    fn default_order(query: Select<Entity>) -> Select<Entity> {
        query.order_by_asc(Column::Name)
    }
}
