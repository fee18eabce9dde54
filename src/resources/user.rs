use chrono::{DateTime, Utc};
use sea_orm::{
    QueryFilter as _, QueryOrder,
    entity::prelude::*,
    sea_query::{Expr, Query},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{role, role_user};
use crate::filtering::{FilterArg, FilterHandler, QueryFilter, where_like};
use crate::listing::ListResource;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "users")]
#[schema(as = User)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::role_user::Entity")]
    RoleUser,
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<role_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoleUser.def()
    }
}

impl Related<role::Entity> for Entity {
    fn to() -> RelationDef {
        role_user::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(role_user::Relation::User.def().rev())
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserFilter;

/// Users holding at least one of the named roles.
///
/// Uses `users.id IN (SELECT role_user.user_id ...)` so a user with several
/// matching roles still appears once.
fn roles(_: &UserFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    let names = arg.values();
    if names.is_empty() {
        return query;
    }
    let holders = Query::select()
        .column((role_user::Entity, role_user::Column::UserId))
        .from(role_user::Entity)
        .inner_join(
            role::Entity,
            Expr::col((role::Entity, role::Column::Id)).equals((role_user::Entity, role_user::Column::RoleId)),
        )
        .and_where(Expr::col((role::Entity, role::Column::Name)).is_in(names))
        .to_owned();
    query.filter(Column::Id.in_subquery(holders))
}

fn name(_: &UserFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_like(query, Column::Name, arg)
}

fn email(_: &UserFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_like(query, Column::Email, arg)
}

impl QueryFilter for UserFilter {
    type Entity = Entity;

    fn handlers() -> Vec<(&'static str, FilterHandler<Self>)> {
        vec![
            ("roles", roles as FilterHandler<Self>),
            ("name", name as FilterHandler<Self>),
            ("email", email as FilterHandler<Self>),
        ]
    }
}

impl ListResource for UserFilter {
    type Item = Model;

    const RESOURCE_NAME_PLURAL: &'static str = "users";
    const ID_COLUMN: Column = Column::Id;

    fn default_order(query: Select<Entity>) -> Select<Entity> {
        query.order_by_asc(Column::Name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_roles_filter_uses_subquery() {
        let spec = crate::filtering::FilterSpec::new()
            .with("roles", FilterArg::List(vec!["admin".into(), "manager".into()]));
        let sql = UserFilter.apply(Entity::find(), &spec).build(DbBackend::Sqlite).to_string();
        assert!(sql.contains(r#""users"."id" IN (SELECT "role_user"."user_id" FROM "role_user""#), "{sql}");
        assert!(sql.contains(r#""roles"."name" IN ('admin', 'manager')"#), "{sql}");
    }

    #[test]
    fn test_single_role_is_accepted() {
        let spec = crate::filtering::FilterSpec::from_query("roles=admin");
        let sql = UserFilter.apply(Entity::find(), &spec).build(DbBackend::Sqlite).to_string();
        assert!(sql.contains(r#""roles"."name" IN ('admin')"#), "{sql}");
    }
}
