#![allow(dead_code)]

use axum::{Router, extract::State, routing::get};
use chrono::{DateTime, TimeZone, Utc};
use issuedesk::resources::{
    attachment, category, executor,
    issue::{self, IssuePriority, IssueStatus, IssueType},
    office, post, role, role_user, statistic, user,
};
use issuedesk::{
    ApiError, FilterSpec, ListConfig, ListParams, ListResource, ResponseEnvelope, resources::IssueFilter,
};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection, DbErr, Schema};
use sea_orm_migration::prelude::*;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    // Handler dispatch logs show up with `cargo test -- --nocapture`
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateTables)]
    }
}

pub struct CreateTables;

#[async_trait::async_trait]
impl MigrationName for CreateTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_issuedesk_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());
        manager.create_table(schema.create_table_from_entity(office::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(category::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(executor::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(user::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(role::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(role_user::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(issue::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(attachment::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(post::Entity)).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in ["posts", "attachments", "issues", "role_user", "roles", "users", "executors", "categories", "offices"] {
            manager.drop_table(Table::drop().table(Alias::new(table)).to_owned()).await?;
        }
        Ok(())
    }
}

// ============================================================================
// Seeding
// ============================================================================

pub async fn insert_office(db: &DatabaseConnection, name: &str) -> Result<office::Model, DbErr> {
    office::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(timestamp()),
        updated_at: Set(timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn insert_category(
    db: &DatabaseConnection,
    name: &str,
    office_id: Option<i32>,
) -> Result<category::Model, DbErr> {
    category::ActiveModel {
        name: Set(name.to_string()),
        parent_id: Set(None),
        office_id: Set(office_id),
        created_at: Set(timestamp()),
        updated_at: Set(timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn insert_executor(db: &DatabaseConnection, name: &str, email: &str) -> Result<executor::Model, DbErr> {
    executor::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        created_at: Set(timestamp()),
        updated_at: Set(timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn insert_user(db: &DatabaseConnection, name: &str, email: &str) -> Result<user::Model, DbErr> {
    user::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        created_at: Set(timestamp()),
        updated_at: Set(timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Users named after `names`, with ids 1.. on a fresh database.
pub async fn insert_users(db: &DatabaseConnection, names: &[&str]) -> Result<Vec<user::Model>, DbErr> {
    let mut users = Vec::with_capacity(names.len());
    for name in names {
        let email = format!("{}@example.com", name.to_lowercase());
        users.push(insert_user(db, name, &email).await?);
    }
    Ok(users)
}

pub async fn insert_role(db: &DatabaseConnection, name: &str) -> Result<role::Model, DbErr> {
    role::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(timestamp()),
        updated_at: Set(timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn assign_role(db: &DatabaseConnection, user_id: i32, role_id: i32) -> Result<(), DbErr> {
    role_user::ActiveModel {
        user_id: Set(user_id),
        role_id: Set(role_id),
    }
    .insert(db)
    .await?;
    Ok(())
}

pub async fn insert_post(db: &DatabaseConnection, title: &str, created_at: DateTime<Utc>) -> Result<post::Model, DbErr> {
    post::ActiveModel {
        title: Set(title.to_string()),
        description: Set(format!("About {title}")),
        user_id: Set(None),
        created_at: Set(created_at),
        updated_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Issue fields tests care about; everything else gets a fixed value.
#[derive(Debug, Clone)]
pub struct IssueSeed {
    pub title: String,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub kind: IssueType,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: Option<i32>,
    pub reporter_id: Option<i32>,
    pub executor_id: Option<i32>,
    pub category_id: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl IssueSeed {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            status: IssueStatus::Pending,
            priority: IssuePriority::Low,
            kind: IssueType::Other,
            due_date: None,
            user_id: None,
            reporter_id: None,
            executor_id: None,
            category_id: None,
            updated_at: timestamp(),
        }
    }

    pub fn status(mut self, status: IssueStatus) -> Self {
        self.status = status;
        self
    }

    pub fn priority(mut self, priority: IssuePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn kind(mut self, kind: IssueType) -> Self {
        self.kind = kind;
        self
    }

    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn owner(mut self, user_id: i32) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn reporter(mut self, user_id: i32) -> Self {
        self.reporter_id = Some(user_id);
        self
    }

    pub fn executor(mut self, executor_id: i32) -> Self {
        self.executor_id = Some(executor_id);
        self
    }

    pub fn category(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn updated(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }
}

pub async fn insert_issue(db: &DatabaseConnection, seed: IssueSeed) -> Result<issue::Model, DbErr> {
    issue::ActiveModel {
        title: Set(seed.title.clone()),
        description: Set(format!("{} description", seed.title)),
        status: Set(seed.status),
        kind: Set(seed.kind),
        priority: Set(seed.priority),
        user_id: Set(seed.user_id),
        reporter_id: Set(seed.reporter_id),
        executor_id: Set(seed.executor_id),
        category_id: Set(seed.category_id),
        parent_id: Set(None),
        due_date: Set(seed.due_date),
        created_at: Set(timestamp()),
        updated_at: Set(seed.updated_at),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn insert_issues(db: &DatabaseConnection, seeds: Vec<IssueSeed>) -> Result<Vec<issue::Model>, DbErr> {
    let mut issues = Vec::with_capacity(seeds.len());
    for seed in seeds {
        issues.push(insert_issue(db, seed).await?);
    }
    Ok(issues)
}

// ============================================================================
// App
// ============================================================================

async fn list_issues(
    State(db): State<DatabaseConnection>,
    axum::extract::Query(params): axum::extract::Query<ListParams>,
    spec: FilterSpec,
    mut envelope: ResponseEnvelope,
) -> Result<ResponseEnvelope, ApiError> {
    let config = ListConfig::default().with_resource(IssueFilter::RESOURCE_NAME_PLURAL, 2);
    let request = params.page_request(&config, IssueFilter::RESOURCE_NAME_PLURAL);
    let page = IssueFilter::new().for_user(1).get_list(&db, &spec, request).await?;
    envelope
        .set_status(true)
        .try_add_entity(&page)
        .map_err(|e| ApiError::internal("Could not serialize issues", Some(e.to_string())))?
        .add_metadata(page.total, Some("total"));
    Ok(envelope)
}

async fn toggle_archive(
    State(db): State<DatabaseConnection>,
    axum::extract::Path(id): axum::extract::Path<i32>,
    mut envelope: ResponseEnvelope,
) -> Result<ResponseEnvelope, ApiError> {
    let issue = issue::toggle_archive(&db, id).await?;
    envelope
        .set_status(true)
        .try_add_entity(&issue)
        .map_err(|e| ApiError::internal("Could not serialize issue", Some(e.to_string())))?
        .add_message("Issue archive state changed", Some("success"));
    Ok(envelope)
}

/// Counts for the signed-in user (id 1) under `metadata.statisticBy<Group>`.
async fn issue_statistics(
    State(db): State<DatabaseConnection>,
    axum::extract::Path(group): axum::extract::Path<String>,
    mut envelope: ResponseEnvelope,
) -> Result<ResponseEnvelope, ApiError> {
    let (rows, tag) = match group.as_str() {
        "priorities" => (statistic::issues_by_priority(&db, 1).await?, "statisticByPriorities"),
        "statuses" => (statistic::issues_by_status(&db, 1).await?, "statisticByStatuses"),
        "categories" => (statistic::issues_by_category(&db, 1).await?, "statisticByCategories"),
        _ => return Err(ApiError::not_found("Statistic", Some(group))),
    };
    envelope
        .set_status(true)
        .add_metadata(statistic::as_metadata(&rows), Some(tag));
    Ok(envelope)
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let api = Router::new()
        .route("/issues", get(list_issues))
        .route("/issues/{id}/archive", axum::routing::post(toggle_archive))
        .route("/statistics/issues/{group}", get(issue_statistics))
        .with_state(db);

    Router::new().nest("/api/v1", api)
}
