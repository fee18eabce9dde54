//! # Error handling
//!
//! `ApiError` maps failures to HTTP status codes and renders them through the
//! same [`ResponseEnvelope`] as successful responses: `status` is `false` and
//! the user-facing messages sit under `message.errors`, always as an array.
//!
//! ```json
//! { "status": false, "entity": null, "message": { "errors": ["Issue with ID '7' not found"] }, "metadata": {} }
//! ```
//!
//! Internal details (database errors, context strings) are logged with
//! `tracing` and never sent to the client.
//!
//! ```rust,ignore
//! async fn show(State(db): State<DatabaseConnection>, Path(id): Path<i32>) -> Result<ResponseEnvelope, ApiError> {
//!     let issue = issue::Entity::find_by_id(id)
//!         .one(&db)
//!         .await?
//!         .ok_or_else(|| ApiError::not_found("Issue", Some(id.to_string())))?;
//!     let mut envelope = ResponseEnvelope::new();
//!     envelope.set_status(true).add_entity(serde_json::to_value(issue).unwrap_or_default());
//!     Ok(envelope)
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use std::fmt;

use crate::response::ResponseEnvelope;

/// Tag under which error messages are stored in the envelope.
pub const ERRORS_TAG: &str = "errors";

#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found
    NotFound {
        /// Resource type (e.g., "Issue", "Office")
        resource: String,
        id: Option<String>,
    },

    /// 400 Bad Request
    BadRequest { message: String },

    /// 401 Unauthorized
    Unauthorized { message: String },

    /// 403 Forbidden
    Forbidden { message: String },

    /// 409 Conflict
    Conflict { message: String },

    /// 422 Unprocessable Entity, one message per failed rule
    ValidationFailed { errors: Vec<String> },

    /// 500, details logged but not exposed
    Database { message: String, internal: DbErr },

    /// 500, generic internal failure
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    // ============================================================================
    // Constructors
    // ============================================================================

    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn validation_failed(errors: Vec<String>) -> Self {
        Self::ValidationFailed { errors }
    }

    /// The database error is logged, the client only sees a generic message.
    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    // ============================================================================
    // Rendering
    // ============================================================================

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Sanitized messages shown to the client.
    #[must_use]
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            Self::NotFound { resource, id: Some(id) } => vec![format!("{resource} with ID '{id}' not found")],
            Self::NotFound { resource, id: None } => vec![format!("{resource} not found")],
            Self::ValidationFailed { errors } => errors.clone(),
            Self::BadRequest { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::Conflict { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => vec![message.clone()],
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(error = %self, status = %self.status_code(), "API error");
            }
        }
    }

    /// The envelope this error renders as. `message.errors` is an array even
    /// for a single message.
    #[must_use]
    pub fn to_envelope(&self) -> ResponseEnvelope {
        let mut envelope = ResponseEnvelope::new();
        envelope
            .set_status(false)
            .add_message(self.user_messages(), Some(ERRORS_TAG));
        envelope
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();
        self.to_envelope()
            .with_status_code(self.status_code())
            .into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_messages().join(", "))
    }
}

impl std::error::Error for ApiError {}

/// `RecordNotFound` becomes a 404, every other `DbErr` a 500.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::RecordNotFound(msg) => {
                let resource = msg.split_whitespace().next().unwrap_or("Resource");
                Self::NotFound {
                    resource: resource.to_string(),
                    id: None,
                }
            }
            _ => Self::database(err),
        }
    }
}
