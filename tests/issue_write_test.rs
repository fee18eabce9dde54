mod common;

use common::{IssueSeed, insert_issue, insert_users, setup_test_db};
use issuedesk::resources::attachment::{self, NewAttachment};
use issuedesk::resources::issue::{self, IssuePriority, IssueStatus, IssueType, NewIssue};
use sea_orm::{DbErr, EntityTrait, PaginatorTrait};

fn new_issue(title: &str) -> NewIssue {
    NewIssue {
        title: title.to_string(),
        description: "The lamp in room 4 flickers".to_string(),
        kind: IssueType::Electricity,
        priority: IssuePriority::Major,
        status: None,
        reporter_id: None,
        executor_id: None,
        category_id: None,
        parent_id: None,
        due_date: None,
    }
}

fn new_attachment(filename: &str) -> NewAttachment {
    NewAttachment {
        title: "photo".to_string(),
        filename: filename.to_string(),
        mime: Some("image/jpeg".to_string()),
    }
}

#[tokio::test]
async fn test_create_issue_with_attachments() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let users = insert_users(&db, &["Alice"]).await.expect("Failed to seed users");

    let (issue, attachments) = issue::create_with_attachments(
        &db,
        Some(users[0].id),
        new_issue("Flickering lamp"),
        vec![new_attachment("uploads/a.jpg"), new_attachment("uploads/b.jpg")],
    )
    .await
    .expect("Failed to create issue");

    assert_eq!(issue.status, IssueStatus::Pending);
    assert_eq!(issue.user_id, Some(users[0].id));
    assert_eq!(attachments.len(), 2);
    assert!(attachments.iter().all(|attachment| attachment.issue_id == issue.id));
    assert_eq!(attachment::Entity::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_failed_attachment_rolls_back_issue() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let users = insert_users(&db, &["Alice"]).await.expect("Failed to seed users");

    // The second attachment reuses a storage path and violates the unique index
    let result = issue::create_with_attachments(
        &db,
        Some(users[0].id),
        new_issue("Flickering lamp"),
        vec![new_attachment("uploads/same.jpg"), new_attachment("uploads/same.jpg")],
    )
    .await;

    assert!(result.is_err());
    assert_eq!(issue::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(attachment::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_new_issue_payload_accepts_issue_id_alias() {
    let payload: NewIssue = serde_json::from_value(serde_json::json!({
        "title": "Leak",
        "description": "Kitchen sink",
        "type": "plumbing",
        "priority": "critical",
        "issue_id": 9
    }))
    .expect("Failed to parse payload");
    assert_eq!(payload.parent_id, Some(9));
    assert_eq!(payload.kind, IssueType::Plumbing);
    assert_eq!(payload.status, None);
}

#[tokio::test]
async fn test_toggle_archive_round_trip() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let created = insert_issue(&db, IssueSeed::new("to archive").status(IssueStatus::InProgress))
        .await
        .expect("Failed to seed issue");

    let archived = issue::toggle_archive(&db, created.id).await.expect("Failed to archive");
    assert_eq!(archived.status, IssueStatus::Archive);

    let restored = issue::toggle_archive(&db, created.id).await.expect("Failed to restore");
    assert_eq!(restored.status, IssueStatus::Pending);
}

#[tokio::test]
async fn test_toggle_archive_missing_issue() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let result = issue::toggle_archive(&db, 404).await;
    assert!(matches!(result, Err(DbErr::RecordNotFound(_))));
}
