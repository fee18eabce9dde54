use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::filtering::{FilterArg, FilterHandler, QueryFilter, where_like};
use crate::listing::ListResource;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "offices")]
#[schema(as = Office)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::category::Entity")]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, Default)]
pub struct OfficeFilter;

fn name(_: &OfficeFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_like(query, Column::Name, arg)
}

impl QueryFilter for OfficeFilter {
    type Entity = Entity;

    fn handlers() -> Vec<(&'static str, FilterHandler<Self>)> {
        vec![("name", name as FilterHandler<Self>)]
    }
}

impl ListResource for OfficeFilter {
    type Item = Model;

    const RESOURCE_NAME_PLURAL: &'static str = "offices";
    const ID_COLUMN: Column = Column::Id;

    fn default_order(query: Select<Entity>) -> Select<Entity> {
        query.order_by_asc(Column::Name)
    }
}
