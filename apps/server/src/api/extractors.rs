//! Custom Axum extractors.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::Error;

/// JSON body whose failures render through the API error envelope instead
/// of axum's plain-text rejections.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        let media_type = content_type.split(';').next().unwrap_or("").trim();
        if !(media_type == "application/json" || media_type.ends_with("+json")) {
            return Err(
                Error::Validation("Expected Content-Type: application/json".to_string())
                    .into_response(),
            );
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            Error::Validation(format!("Failed to read request body: {e}")).into_response()
        })?;

        serde_json::from_slice(&bytes).map(ApiJson).map_err(|e| {
            Error::Validation(format!("Invalid JSON body: {e}")).into_response()
        })
    }
}

/// Query string as ordered, percent-decoded `(key, value)` pairs.
/// Repeated keys are kept.
#[derive(Debug, Clone, Default)]
pub struct QueryItems(pub Vec<(String, String)>);

impl QueryItems {
    pub fn parse(raw: &str) -> Self {
        // `form_urlencoded` treats '+' as a space, like browsers do.
        Self(
            url::form_urlencoded::parse(raw.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    /// Last non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, v)| k == key && !v.trim().is_empty())
            .map(|(_, v)| v.trim())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for QueryItems
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.uri.query().map(QueryItems::parse).unwrap_or_default())
    }
}
