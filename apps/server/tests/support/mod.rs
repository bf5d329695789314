pub mod assertions;
pub mod builders;
pub mod fakes;

use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use homestead::{api::create_router, db::MemoryStore, AppState, Config};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt as _;

pub use assertions::*;
pub use builders::*;
pub use fakes::*;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const ADMIN_SUBJECT: &str = "auth0|admin-1";
pub const USER_SUBJECT: &str = "auth0|user-1";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub host: Arc<RecordingHost>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        Self::new_with_config(|_| {}).await
    }

    pub async fn new_with_config(configure: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        Self::with_host(RecordingHost::default(), configure).await
    }

    pub async fn with_host(
        host: RecordingHost,
        configure: impl FnOnce(&mut Config),
    ) -> anyhow::Result<Self> {
        let mut config = Config::default();
        config.auth.oidc.shared_secret = Some(TEST_SECRET.to_string());
        configure(&mut config);

        let store = Arc::new(MemoryStore::new());
        let host = Arc::new(host);
        let state = AppState::with_backends(config, store.clone(), store, host.clone())
            .context("initialize AppState")?;
        let router = create_router(state.clone());

        Ok(Self {
            router,
            state,
            host,
        })
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> anyhow::Result<TestResponse> {
        self.send(Method::GET, path, token, None, None).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> anyhow::Result<TestResponse> {
        self.send(Method::DELETE, path, token, None, None).await
    }

    pub async fn json(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> anyhow::Result<TestResponse> {
        let bytes = Bytes::from(serde_json::to_vec(body)?);
        self.send(method, path, token, Some("application/json"), Some(bytes))
            .await
    }

    pub async fn multipart(
        &self,
        path: &str,
        token: Option<&str>,
        form: MultipartForm,
    ) -> anyhow::Result<TestResponse> {
        let (content_type, bytes) = form.finish();
        self.send(Method::POST, path, token, Some(&content_type), Some(bytes))
            .await
    }

    pub async fn send(
        &self,
        method: Method,
        path_and_query: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: Option<Bytes>,
    ) -> anyhow::Result<TestResponse> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path_and_query)
            .header(header::HOST, "example.org")
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder
            .body(match body {
                Some(bytes) => Body::from(bytes),
                None => Body::empty(),
            })
            .context("build request")?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }

    /// Creates a listing as admin and returns its id.
    pub async fn create_property(&self, listing: &Value) -> anyhow::Result<String> {
        let response = self
            .json(Method::POST, "/api/properties", Some(&admin_token()), listing)
            .await?;
        assert_status(&response, StatusCode::CREATED, "create property");
        response.body["data"]["id"]
            .as_str()
            .map(str::to_string)
            .context("created property has an id")
    }

    /// Uploads a small PNG and returns the upload id.
    pub async fn upload_image(&self, name: &str) -> anyhow::Result<String> {
        let form = MultipartForm::new().file("file", name, "image/png", PNG_BYTES);
        let response = self
            .multipart("/api/upload", Some(&admin_token()), form)
            .await?;
        assert_status(&response, StatusCode::CREATED, "upload image");
        response.body["data"]["id"]
            .as_str()
            .map(str::to_string)
            .context("upload has an id")
    }
}

/// Eight bytes of PNG signature; the fake host never decodes them.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

pub fn token(subject: &str, roles: &[&str]) -> String {
    let claims = json!({
        "sub": subject,
        "roles": roles,
        "iat": chrono::Utc::now().timestamp(),
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("encode test token")
}

pub fn admin_token() -> String {
    token(ADMIN_SUBJECT, &["admin"])
}

pub fn user_token() -> String {
    token(USER_SUBJECT, &[])
}
