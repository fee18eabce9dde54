use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter as _, QueryOrder, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::filtering::{FilterArg, FilterHandler, QueryFilter, where_id, where_like};
use crate::listing::ListResource;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "categories")]
#[schema(as = Category)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub office_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::office::Entity",
        from = "Column::OfficeId",
        to = "super::office::Column::Id",
        on_delete = "SetNull"
    )]
    Office,
    #[sea_orm(has_many = "super::issue::Entity")]
    Issue,
}

impl Related<super::office::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Office.def()
    }
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Lists categories, optionally restricted to one office.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryFilter {
    pub office_id: Option<i32>,
}

impl CategoryFilter {
    #[must_use]
    pub const fn for_office(office_id: i32) -> Self {
        Self {
            office_id: Some(office_id),
        }
    }
}

fn name(_: &CategoryFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_like(query, Column::Name, arg)
}

fn parent(_: &CategoryFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_id(query, Column::ParentId, arg)
}

impl QueryFilter for CategoryFilter {
    type Entity = Entity;

    fn handlers() -> Vec<(&'static str, FilterHandler<Self>)> {
        vec![
            ("name", name as FilterHandler<Self>),
            ("parent", parent as FilterHandler<Self>),
        ]
    }
}

impl ListResource for CategoryFilter {
    type Item = Model;

    const RESOURCE_NAME_PLURAL: &'static str = "categories";
    const ID_COLUMN: Column = Column::Id;

    fn base_query(&self) -> Select<Entity> {
        match self.office_id {
            Some(office_id) => Entity::find().filter(Column::OfficeId.eq(office_id)),
            None => Entity::find(),
        }
    }

    fn default_order(query: Select<Entity>) -> Select<Entity> {
        query.order_by_asc(Column::Name)
    }
}
