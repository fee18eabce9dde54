use async_trait::async_trait;
use sea_orm::{
    DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait, QueryOrder, QuerySelect, Select,
};
use serde::Serialize;

use crate::filtering::{FilterSpec, Page, PageRequest, QueryFilter};

type ModelOf<R> = <<R as QueryFilter>::Entity as EntityTrait>::Model;
type ColumnOf<R> = <<R as QueryFilter>::Entity as EntityTrait>::Column;

/// A filter that can serve a paginated list endpoint.
///
/// The page is built in a fixed order: base query, filter handlers
/// (including any explicit sort), the resource's default order, then the
/// primary key as the final tie-break so that consecutive pages never
/// overlap or skip rows.
#[async_trait]
pub trait ListResource: QueryFilter + Send + Sync {
    type Item: From<ModelOf<Self>> + Serialize + Send;

    const RESOURCE_NAME_PLURAL: &'static str;
    const ID_COLUMN: ColumnOf<Self>;

    /// Rows visible to this list before any filter runs.
    fn base_query(&self) -> Select<Self::Entity> {
        Self::Entity::find()
    }

    /// Ordering appended after any explicit sort handler.
    fn default_order(query: Select<Self::Entity>) -> Select<Self::Entity> {
        query
    }

    /// Turn fetched rows into list items. Override to eager-load relations.
    async fn hydrate(&self, _db: &DatabaseConnection, models: Vec<ModelOf<Self>>) -> Result<Vec<Self::Item>, DbErr> {
        Ok(models.into_iter().map(Self::Item::from).collect())
    }

    /// Base query with filters applied, without default ordering.
    fn filtered_query(&self, spec: &FilterSpec) -> Select<Self::Entity> {
        self.apply(self.base_query(), spec)
    }

    /// The full, deterministically ordered list query.
    fn list_query(&self, spec: &FilterSpec) -> Select<Self::Entity> {
        Self::default_order(self.filtered_query(spec)).order_by(Self::ID_COLUMN, Order::Asc)
    }

    async fn get_list(
        &self,
        db: &DatabaseConnection,
        spec: &FilterSpec,
        request: PageRequest,
    ) -> Result<Page<Self::Item>, DbErr>
    where
        ModelOf<Self>: Sync,
    {
        let total = PaginatorTrait::count(self.filtered_query(spec), db).await?;
        let models = self
            .list_query(spec)
            .offset(request.offset())
            .limit(request.per_page)
            .all(db)
            .await?;
        tracing::debug!(
            resource = Self::RESOURCE_NAME_PLURAL,
            total,
            page = request.page,
            per_page = request.per_page,
            fetched = models.len(),
            "listed rows"
        );
        let items = self.hydrate(db, models).await?;
        Ok(Page::new(items, request, total))
    }
}
