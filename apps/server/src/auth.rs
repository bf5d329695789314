//! Authentication / Authorization primitives.
//!
//! The server acts as an OAuth2/OIDC *resource server*: an external identity
//! provider performs login, and this server validates the bearer tokens it
//! issued. Keys come from the provider's JWKS (RS256) or, for single-tenant
//! setups and tests, from a configured HS256 shared secret.

use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use crate::{models::ANONYMOUS_UPLOADER, state::AppState, Config};

/// Subject used for every request while authentication is disabled.
pub const LOCAL_SUBJECT: &str = "local-admin";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Principal {
    pub subject: String,
    pub roles: Vec<String>,
    pub issuer: Option<String>,
    pub email: Option<String>,
    pub is_admin: bool,
}

impl Principal {
    /// Stand-in principal when auth is switched off in configuration.
    pub fn local_admin() -> Self {
        Self {
            subject: LOCAL_SUBJECT.to_string(),
            roles: Vec::new(),
            issuer: None,
            email: None,
            is_admin: true,
        }
    }
}

/// Subject recorded as uploader, `"anonymous"` without a principal.
pub fn uploader_subject(principal: Option<&Principal>) -> String {
    principal
        .map(|p| p.subject.clone())
        .unwrap_or_else(|| ANONYMOUS_UPLOADER.to_string())
}

#[derive(Debug, Clone)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
    Misconfigured(String),
    Upstream(String),
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Self::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MissingToken => "Missing bearer token".to_string(),
            Self::InvalidToken(msg) => format!("Invalid bearer token: {msg}"),
            Self::Misconfigured(_) => "Authentication is misconfigured".to_string(),
            Self::Upstream(_) => "Identity provider unavailable".to_string(),
        }
    }

    fn www_authenticate(&self) -> Option<&'static str> {
        match self {
            Self::MissingToken | Self::InvalidToken(_) => Some("Bearer"),
            Self::Misconfigured(_) | Self::Upstream(_) => None,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            Self::Misconfigured(detail) | Self::Upstream(detail) => {
                tracing::error!(error = %detail, "Authentication failure");
            }
            Self::InvalidToken(detail) => tracing::debug!(error = %detail, "Rejected token"),
            Self::MissingToken => {}
        }

        let body = axum::Json(json!({
            "success": false,
            "error": self.message(),
            "details": null,
        }));

        let mut response = (self.status(), body).into_response();
        if let Some(www) = self.www_authenticate() {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static(www));
        }
        response
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OidcDiscovery {
    pub issuer: Option<String>,
    pub jwks_uri: String,
}

#[derive(Debug, Default)]
struct JwksCache {
    jwks_uri: Option<String>,
    jwks: Option<JwkSet>,
    fetched_at: Option<Instant>,
}

#[derive(Clone)]
pub struct AuthManager {
    config: Arc<Config>,
    http: reqwest::Client,
    jwks_cache: Arc<RwLock<JwksCache>>,
}

impl AuthManager {
    pub fn new(config: Arc<Config>) -> Result<Self, AuthError> {
        let timeout = Duration::from_secs(config.auth.oidc.http_timeout_seconds);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Misconfigured(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http,
            jwks_cache: Arc::new(RwLock::new(JwksCache::default())),
        })
    }

    pub fn enabled(&self) -> bool {
        self.config.auth.enabled
    }

    pub fn required(&self) -> bool {
        self.config.auth.required
    }

    pub fn is_public_path(&self, path: &str) -> bool {
        self.config.auth.public_paths.iter().any(|p| p == path)
    }

    /// Validates the bearer token in `headers`, if any.
    ///
    /// A missing header yields `Ok(None)` unless auth is required; a present
    /// but invalid token is always an error.
    pub async fn authenticate_headers(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<Principal>, AuthError> {
        let Some(authz) = headers.get(header::AUTHORIZATION) else {
            return if self.required() {
                Err(AuthError::MissingToken)
            } else {
                Ok(None)
            };
        };

        let authz = authz.to_str().map_err(|_| {
            AuthError::InvalidToken("Authorization header is not valid UTF-8".to_string())
        })?;

        let token = authz
            .strip_prefix("Bearer ")
            .or_else(|| authz.strip_prefix("bearer "))
            .ok_or_else(|| {
                AuthError::InvalidToken("Authorization header must be 'Bearer <token>'".to_string())
            })?;

        let token_data = self.decode_and_validate_jwt(token.trim()).await?;
        Ok(Some(self.principal_from_claims(token_data.claims)))
    }

    fn validation(&self, alg: Algorithm) -> Validation {
        let oidc = &self.config.auth.oidc;
        let mut validation = Validation::new(alg);
        if let Some(issuer) = &oidc.issuer_url {
            validation.set_issuer(&[issuer.trim_end_matches('/'), issuer.as_str()]);
        }
        match &oidc.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation.leeway = 60;
        validation
    }

    async fn decode_and_validate_jwt(
        &self,
        token: &str,
    ) -> Result<TokenData<serde_json::Value>, AuthError> {
        let header = decode_header(token)
            .map_err(|e| AuthError::InvalidToken(format!("Failed to decode JWT header: {e}")))?;

        if let Some(secret) = &self.config.auth.oidc.shared_secret {
            if header.alg != Algorithm::HS256 {
                return Err(AuthError::InvalidToken(format!(
                    "Unsupported JWT alg '{:?}' (expected HS256)",
                    header.alg
                )));
            }
            let key = DecodingKey::from_secret(secret.as_bytes());
            return decode::<serde_json::Value>(token, &key, &self.validation(Algorithm::HS256))
                .map_err(|e| AuthError::InvalidToken(e.to_string()));
        }

        // Only RS256 is accepted from JWKS to rule out algorithm confusion.
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidToken(format!(
                "Unsupported JWT alg '{:?}' (only RS256 is supported)",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("JWT header missing 'kid'".to_string()))?;

        let jwks = self.get_jwks().await?;
        let jwk = jwks
            .find(&kid)
            .ok_or_else(|| AuthError::InvalidToken(format!("No matching JWK for kid '{kid}'")))?;
        let decoding_key = decoding_key_from_jwk(jwk)?;

        decode::<serde_json::Value>(token, &decoding_key, &self.validation(Algorithm::RS256))
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn principal_from_claims(&self, claims: serde_json::Value) -> Principal {
        let subject = claims
            .get("sub")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let roles = extract_roles(&claims);
        let issuer = claims
            .get("iss")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let email = claims
            .get("email")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let auth = &self.config.auth;
        let is_admin = roles.iter().any(|r| r == &auth.admin_role)
            || auth.admin_subjects.iter().any(|s| s == &subject);

        Principal {
            subject,
            roles,
            issuer,
            email,
            is_admin,
        }
    }

    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        let ttl = Duration::from_secs(self.config.auth.oidc.jwks_cache_ttl_seconds);

        {
            let cache = self.jwks_cache.read().await;
            if let (Some(jwks), Some(fetched_at)) = (&cache.jwks, cache.fetched_at) {
                if fetched_at.elapsed() <= ttl {
                    return Ok(jwks.clone());
                }
            }
        }

        let jwks_uri = self.get_jwks_uri().await?;
        let jwks = self.fetch_json::<JwkSet>(&jwks_uri, "JWKS").await?;

        let mut cache = self.jwks_cache.write().await;
        cache.jwks = Some(jwks.clone());
        cache.jwks_uri = Some(jwks_uri);
        cache.fetched_at = Some(Instant::now());
        Ok(jwks)
    }

    async fn get_jwks_uri(&self) -> Result<String, AuthError> {
        if let Some(uri) = self.config.auth.oidc.jwks_url.clone() {
            return Ok(uri);
        }

        {
            let cache = self.jwks_cache.read().await;
            if let Some(uri) = cache.jwks_uri.clone() {
                return Ok(uri);
            }
        }

        let issuer = self.config.auth.oidc.issuer_url.clone().ok_or_else(|| {
            AuthError::Misconfigured("auth.oidc.issuer_url is not set".to_string())
        })?;
        let url = format!(
            "{}/.well-known/openid-configuration",
            issuer.trim_end_matches('/')
        );
        let discovery = self.fetch_json::<OidcDiscovery>(&url, "OIDC discovery").await?;
        Ok(discovery.jwks_uri)
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        what: &str,
    ) -> Result<T, AuthError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AuthError::Upstream(format!("{what} fetch failed: {e}")))?;
        if !res.status().is_success() {
            return Err(AuthError::Upstream(format!(
                "{what} returned HTTP {}",
                res.status()
            )));
        }
        res.json::<T>()
            .await
            .map_err(|e| AuthError::Upstream(format!("{what} JSON parse failed: {e}")))
    }
}

fn decoding_key_from_jwk(jwk: &jsonwebtoken::jwk::Jwk) -> Result<DecodingKey, AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
            .map_err(|e| AuthError::InvalidToken(format!("Failed to build RSA decoding key: {e}"))),
        _ => Err(AuthError::InvalidToken(
            "Unsupported JWK type (only RSA keys are supported)".to_string(),
        )),
    }
}

/// Collects `role` (string) and `roles` (array) claims.
fn extract_roles(claims: &serde_json::Value) -> Vec<String> {
    let mut roles = Vec::new();
    if let Some(role) = claims.get("role").and_then(|v| v.as_str()) {
        roles.push(role.to_string());
    }
    if let Some(arr) = claims.get("roles").and_then(|v| v.as_array()) {
        roles.extend(arr.iter().filter_map(|v| v.as_str().map(|s| s.to_string())));
    }
    roles
}

/// Extractor for the authenticated principal attached by middleware.
///
/// Use `Option<AuthenticatedPrincipal>` in handlers for optional auth.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal(pub Principal);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedPrincipal
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthenticatedPrincipal)
            .ok_or_else(|| AuthError::MissingToken.into_response())
    }
}

/// Authenticated principal holding admin rights; 403 otherwise.
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub Principal);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AdminPrincipal
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedPrincipal(principal) =
            AuthenticatedPrincipal::from_request_parts(parts, state).await?;
        if !principal.is_admin {
            tracing::debug!(subject = %principal.subject, "Admin access denied");
            return Err(
                crate::Error::Forbidden("Admin access required".to_string()).into_response(),
            );
        }
        Ok(AdminPrincipal(principal))
    }
}

/// Attaches the caller's `Principal` to the request.
///
/// Requests without a token continue anonymously; handlers decide through
/// their extractors whether that is enough.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    if !state.auth.enabled() {
        req.extensions_mut().insert(Principal::local_admin());
        return next.run(req).await;
    }

    // Nested routers see a stripped path; public paths are configured in full.
    let path = req
        .extensions()
        .get::<axum::extract::OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    if state.auth.is_public_path(&path) || req.method() == axum::http::Method::OPTIONS {
        return next.run(req).await;
    }

    match state.auth.authenticate_headers(req.headers()).await {
        Ok(Some(principal)) => {
            tracing::Span::current().record("subject", principal.subject.as_str());
            req.extensions_mut().insert::<Principal>(principal);
            next.run(req).await
        }
        Ok(None) => next.run(req).await,
        Err(err) => err.into_response(),
    }
}
