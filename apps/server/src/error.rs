//! Error types for the listing API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::cdn::CdnError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Validation(String),

    #[error("Validation failed")]
    InvalidFields(#[from] validator::ValidationErrors),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error("Image host error: {0}")]
    Upstream(#[from] CdnError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidFields(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Database(_)
            | Error::Migration(_)
            | Error::Upstream(_)
            | Error::Serialization(_)
            | Error::Internal(_)
            | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> JsonValue {
        match self {
            Error::InvalidFields(errors) => field_details(errors),
            Error::NotFound { resource, id } => json!({ "resource": resource, "id": id }),
            _ => JsonValue::Null,
        }
    }
}

impl From<homestead_query::QueryError> for Error {
    fn from(err: homestead_query::QueryError) -> Self {
        Error::Validation(err.to_string())
    }
}

impl From<crate::models::ImageNotAttached> for Error {
    fn from(err: crate::models::ImageNotAttached) -> Self {
        Error::Validation(format!(
            "Featured image {} is not one of the property's images",
            err.0
        ))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Internal error");
            match &self {
                Error::Upstream(_) => "Image upload failed".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "success": false,
            "error": message,
            "details": self.details(),
        }));

        (status, body).into_response()
    }
}

/// Flattens nested validator errors into `{"location.city": ["..."]}`.
fn field_details(errors: &validator::ValidationErrors) -> JsonValue {
    let mut out = serde_json::Map::new();
    collect_field_errors(errors, "", &mut out);
    JsonValue::Object(out)
}

fn collect_field_errors(
    errors: &validator::ValidationErrors,
    prefix: &str,
    out: &mut serde_json::Map<String, JsonValue>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages: Vec<JsonValue> = list
                    .iter()
                    .map(|e| {
                        JsonValue::String(
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("invalid value ({})", e.code)),
                        )
                    })
                    .collect();
                out.insert(path, JsonValue::Array(messages));
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Draft {
        #[validate(length(min = 1, message = "Title is required"))]
        title: String,
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            Error::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::not_found("Property", "abc").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(Error::Conflict("dup".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            Error::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn field_errors_are_keyed_by_field() {
        let errors = Draft {
            title: String::new(),
        }
        .validate()
        .unwrap_err();
        let details = field_details(&errors);
        assert_eq!(details["title"], json!(["Title is required"]));
    }

    #[tokio::test]
    async fn host_error_detail_stays_out_of_the_response() {
        let err = Error::Upstream(CdnError::Rejected {
            status: 401,
            message: "Invalid api_key 1234".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], json!("Image upload failed"));
        assert!(!bytes.windows(7).any(|w| w == b"api_key"));
    }
}
