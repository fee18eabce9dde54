use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::filtering::{FilterArg, FilterHandler, QueryFilter, where_like};
use crate::listing::ListResource;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "roles")]
#[schema(as = Role)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::role_user::Entity")]
    RoleUser,
}

impl Related<super::role_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoleUser.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::role_user::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::role_user::Relation::Role.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoleFilter;

fn name(_: &RoleFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_like(query, Column::Name, arg)
}

impl QueryFilter for RoleFilter {
    type Entity = Entity;

    fn handlers() -> Vec<(&'static str, FilterHandler<Self>)> {
        vec![("name", name as FilterHandler<Self>)]
    }
}

impl ListResource for RoleFilter {
    type Item = Model;

    const RESOURCE_NAME_PLURAL: &'static str = "roles";
    const ID_COLUMN: Column = Column::Id;

    fn default_order(query: Select<Entity>) -> Select<Entity> {
        query.order_by_asc(Column::Name)
    }
}
