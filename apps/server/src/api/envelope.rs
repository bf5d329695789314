//! Response envelopes.
//!
//! Success bodies carry `"success": true`; lists add `count`, `total` and
//! `pagination`. Errors are rendered by `crate::Error`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use homestead_query::{PagePlan, PaginationMeta};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ListEnvelope<T> {
    pub success: bool,
    /// Items on this page.
    pub count: usize,
    /// Items matching the query across all pages.
    pub total: u64,
    pub pagination: PaginationMeta,
    pub data: Vec<T>,
}

impl<T> ListEnvelope<T> {
    pub fn new(data: Vec<T>, total: u64, page: PagePlan) -> Self {
        Self {
            success: true,
            count: data.len(),
            total,
            pagination: page.meta(total),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ListEnvelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> DataEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
            status: StatusCode::OK,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for DataEnvelope<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

/// Several entities created in one request.
#[derive(Debug, Serialize)]
pub struct BatchEnvelope<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> BatchEnvelope<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for BatchEnvelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

/// Body for operations without a payload, e.g. deletes.
#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub success: bool,
    pub message: String,
}

impl MessageEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

impl IntoResponse for MessageEnvelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_envelope_reports_page_and_totals() {
        let envelope = ListEnvelope::new(vec!["a", "b"], 25, PagePlan::new(3, 12));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "success": true,
                "count": 2,
                "total": 25,
                "pagination": { "page": 3, "pages": 3, "limit": 12 },
                "data": ["a", "b"]
            })
        );
    }

    #[test]
    fn data_envelope_omits_missing_message() {
        let body = serde_json::to_value(DataEnvelope::created(1)).unwrap();
        assert_eq!(body, json!({ "success": true, "data": 1 }));

        let body = serde_json::to_value(DataEnvelope::ok(1).with_message("Updated")).unwrap();
        assert_eq!(body["message"], json!("Updated"));
    }

    #[test]
    fn batch_envelope_counts_items() {
        let response = BatchEnvelope::new(vec![1, 2, 3]).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = serde_json::to_value(BatchEnvelope::new(vec![1, 2, 3])).unwrap();
        assert_eq!(body, json!({ "success": true, "count": 3, "data": [1, 2, 3] }));
    }

    #[test]
    fn created_envelope_uses_201() {
        assert_eq!(
            DataEnvelope::created(()).into_response().status(),
            StatusCode::CREATED
        );
    }
}
