use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveValue::Set, DatabaseConnection, LoaderTrait, QueryFilter as _, QueryOrder, TransactionTrait,
    entity::prelude::*, sea_query::StringLen,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::attachment::{self, NewAttachment};
use super::{category, executor, user};
use crate::filtering::{
    FilterArg, FilterHandler, QueryFilter, SortKey, SortableFilter, sort_by_asc, sort_by_desc, where_eq_or_in,
    where_id, where_like,
};
use crate::listing::ListResource;

/// Workflow state. Ranked in declaration order; `Archive` sits outside the
/// workflow and ranks last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum IssueStatus {
    #[sea_orm(string_value = "pending")]
    #[serde(rename = "pending")]
    Pending,
    #[sea_orm(string_value = "in progress")]
    #[serde(rename = "in progress")]
    InProgress,
    #[sea_orm(string_value = "closed")]
    #[serde(rename = "closed")]
    Closed,
    #[sea_orm(string_value = "done")]
    #[serde(rename = "done")]
    Done,
    #[sea_orm(string_value = "archive")]
    #[serde(rename = "archive")]
    Archive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum IssuePriority {
    #[sea_orm(string_value = "trivial")]
    Trivial,
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "major")]
    Major,
    #[sea_orm(string_value = "critical")]
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    #[sea_orm(string_value = "electricity")]
    Electricity,
    #[sea_orm(string_value = "plumbing")]
    Plumbing,
    #[sea_orm(string_value = "office")]
    Office,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "issues")]
#[schema(as = Issue)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: IssueStatus,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: IssueType,
    pub priority: IssuePriority,
    /// Owner of the issue.
    pub user_id: Option<i32>,
    /// Who reported it, when filed on someone else's behalf.
    pub reporter_id: Option<i32>,
    pub executor_id: Option<i32>,
    pub category_id: Option<i32>,
    pub parent_id: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::executor::Entity",
        from = "Column::ExecutorId",
        to = "super::executor::Column::Id",
        on_delete = "SetNull"
    )]
    Executor,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReporterId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Reporter,
    #[sea_orm(has_many = "super::attachment::Entity")]
    Attachment,
}

impl Related<executor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Executor.def()
    }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ============================================================================
// Filter
// ============================================================================

/// Which archived issues a list may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveScope {
    #[default]
    Exclude,
    Include,
    Only,
}

/// Issue list filter. Carries the request context handlers may need.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssueFilter {
    /// Used by the `user` flag.
    pub current_user: Option<i32>,
    pub archive: ArchiveScope,
    pub category_id: Option<i32>,
}

impl IssueFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn for_user(mut self, user_id: i32) -> Self {
        self.current_user = Some(user_id);
        self
    }

    #[must_use]
    pub const fn with_archive(mut self, archive: ArchiveScope) -> Self {
        self.archive = archive;
        self
    }

    #[must_use]
    pub const fn in_category(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Date part of `2024-03-01`, `2024-03-01T10:00:00Z` or `2024-03-01 10:00`.
fn parse_day(arg: &FilterArg) -> Option<NaiveDate> {
    let value = arg.as_str()?.trim();
    let day = value.split(['T', ' ']).next()?;
    match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::debug!(value = %value, error = %e, "ignoring malformed date filter");
            None
        }
    }
}

fn start_of(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn status(_: &IssueFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_eq_or_in(query, Column::Status, arg)
}

fn archive_status(_: &IssueFilter, query: Select<Entity>, _arg: &FilterArg) -> Select<Entity> {
    query.filter(Column::Status.eq(IssueStatus::Archive))
}

fn priority(_: &IssueFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_eq_or_in(query, Column::Priority, arg)
}

/// An explicit id, or the current user when sent as a bare flag.
fn by_user(filter: &IssueFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    let user_id = if arg.is_flag() { filter.current_user } else { arg.as_id() };
    match user_id {
        Some(user_id) => query.filter(Column::UserId.eq(user_id)),
        None => {
            tracing::debug!("user filter without a usable id");
            query
        }
    }
}

/// Due on or after the given day.
fn due_from(_: &IssueFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    match parse_day(arg) {
        Some(day) => query.filter(Column::DueDate.gte(start_of(day))),
        None => query,
    }
}

/// Due on or before the given day.
fn due_to(_: &IssueFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    match parse_day(arg).and_then(|day| day.succ_opt()) {
        Some(next_day) => query.filter(Column::DueDate.lt(start_of(next_day))),
        None => query,
    }
}

fn title(_: &IssueFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_like(query, Column::Title, arg)
}

fn by_reporter(_: &IssueFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_id(query, Column::ReporterId, arg)
}

fn by_executor(_: &IssueFilter, query: Select<Entity>, arg: &FilterArg) -> Select<Entity> {
    where_id(query, Column::ExecutorId, arg)
}

impl QueryFilter for IssueFilter {
    type Entity = Entity;

    fn handlers() -> Vec<(&'static str, FilterHandler<Self>)> {
        vec![
            ("status", status as FilterHandler<Self>),
            ("archiveStatus", archive_status as FilterHandler<Self>),
            ("priority", priority as FilterHandler<Self>),
            ("user", by_user as FilterHandler<Self>),
            ("from", due_from as FilterHandler<Self>),
            ("to", due_to as FilterHandler<Self>),
            ("title", title as FilterHandler<Self>),
            ("sortByAsc", sort_by_asc::<Self> as FilterHandler<Self>),
            ("sortByDesc", sort_by_desc::<Self> as FilterHandler<Self>),
            ("reporter", by_reporter as FilterHandler<Self>),
            ("executor", by_executor as FilterHandler<Self>),
        ]
    }
}

impl SortableFilter for IssueFilter {
    fn sortable_columns() -> Vec<(&'static str, SortKey<Column>)> {
        vec![
            ("priority", SortKey::ranked_by::<IssuePriority>(Column::Priority)),
            ("status", SortKey::ranked_by::<IssueStatus>(Column::Status)),
            ("type", SortKey::ranked_by::<IssueType>(Column::Kind)),
            ("due_date", SortKey::Column(Column::DueDate)),
        ]
    }
}

// ============================================================================
// Listing
// ============================================================================

/// An issue with its owner, reporter, executor and category loaded.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IssueListItem {
    #[serde(flatten)]
    pub issue: Model,
    pub user: Option<user::Model>,
    pub reporter: Option<user::Model>,
    pub executor: Option<executor::Model>,
    pub category: Option<category::Model>,
}

impl From<Model> for IssueListItem {
    fn from(issue: Model) -> Self {
        Self {
            issue,
            user: None,
            reporter: None,
            executor: None,
            category: None,
        }
    }
}

/// Owners and reporters share the users table, so both are fetched with a
/// single `IN` query.
async fn load_users(db: &DatabaseConnection, issues: &[Model]) -> Result<HashMap<i32, user::Model>, DbErr> {
    let ids: BTreeSet<i32> = issues
        .iter()
        .flat_map(|issue| [issue.user_id, issue.reporter_id])
        .flatten()
        .collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = user::Entity::find().filter(user::Column::Id.is_in(ids)).all(db).await?;
    Ok(users.into_iter().map(|user| (user.id, user)).collect())
}

#[async_trait]
impl ListResource for IssueFilter {
    type Item = IssueListItem;

    const RESOURCE_NAME_PLURAL: &'static str = "issues";
    const ID_COLUMN: Column = Column::Id;

    fn base_query(&self) -> Select<Entity> {
        let query = match self.archive {
            ArchiveScope::Exclude => Entity::find().filter(Column::Status.ne(IssueStatus::Archive)),
            ArchiveScope::Include => Entity::find(),
            ArchiveScope::Only => Entity::find().filter(Column::Status.eq(IssueStatus::Archive)),
        };
        match self.category_id {
            Some(category_id) => query.filter(Column::CategoryId.eq(category_id)),
            None => query,
        }
    }

    fn default_order(query: Select<Entity>) -> Select<Entity> {
        query.order_by_desc(Column::UpdatedAt).order_by_desc(Column::CreatedAt)
    }

    async fn hydrate(&self, db: &DatabaseConnection, models: Vec<Model>) -> Result<Vec<IssueListItem>, DbErr> {
        let users = load_users(db, &models).await?;
        let executors = models.load_one(executor::Entity, db).await?;
        let categories = models.load_one(category::Entity, db).await?;
        Ok(models
            .into_iter()
            .zip(executors)
            .zip(categories)
            .map(|((issue, executor), category)| IssueListItem {
                user: issue.user_id.and_then(|id| users.get(&id).cloned()),
                reporter: issue.reporter_id.and_then(|id| users.get(&id).cloned()),
                issue,
                executor,
                category,
            })
            .collect())
    }
}

// ============================================================================
// Writes
// ============================================================================

/// Payload for a new issue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: IssueType,
    pub priority: IssuePriority,
    /// Defaults to `pending`.
    pub status: Option<IssueStatus>,
    pub reporter_id: Option<i32>,
    pub executor_id: Option<i32>,
    pub category_id: Option<i32>,
    #[serde(alias = "issue_id")]
    pub parent_id: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Insert an issue and its attachments atomically. If any attachment insert
/// fails, nothing is stored.
///
/// # Errors
///
/// Returns the `DbErr` of the first failing statement.
pub async fn create_with_attachments(
    db: &DatabaseConnection,
    user_id: Option<i32>,
    new_issue: NewIssue,
    attachments: Vec<NewAttachment>,
) -> Result<(Model, Vec<attachment::Model>), DbErr> {
    let txn = db.begin().await?;
    let now = Utc::now();

    let issue = ActiveModel {
        title: Set(new_issue.title),
        description: Set(new_issue.description),
        status: Set(new_issue.status.unwrap_or(IssueStatus::Pending)),
        kind: Set(new_issue.kind),
        priority: Set(new_issue.priority),
        user_id: Set(user_id),
        reporter_id: Set(new_issue.reporter_id),
        executor_id: Set(new_issue.executor_id),
        category_id: Set(new_issue.category_id),
        parent_id: Set(new_issue.parent_id),
        due_date: Set(new_issue.due_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut stored = Vec::with_capacity(attachments.len());
    for new_attachment in attachments {
        let attachment = attachment::ActiveModel {
            issue_id: Set(issue.id),
            title: Set(new_attachment.title),
            filename: Set(new_attachment.filename),
            mime: Set(new_attachment.mime),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        stored.push(attachment);
    }

    txn.commit().await?;
    tracing::debug!(issue_id = issue.id, attachments = stored.len(), "issue created");
    Ok((issue, stored))
}

/// Move an issue into the archive, or back to `pending` if it is archived.
///
/// # Errors
///
/// `DbErr::RecordNotFound` when no issue has this id.
pub async fn toggle_archive(db: &DatabaseConnection, id: i32) -> Result<Model, DbErr> {
    let issue = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Issue {id} not found")))?;
    let next = match issue.status {
        IssueStatus::Archive => IssueStatus::Pending,
        _ => IssueStatus::Archive,
    };
    let mut active: ActiveModel = issue.into();
    active.status = Set(next);
    active.updated_at = Set(Utc::now());
    active.update(db).await
}
