//! External image host.
//!
//! Binary assets live on a third-party CDN. The rest of the server only sees
//! the [`ImageHost`] trait, so tests can swap in a fake and deployments
//! without credentials get a host that refuses every call.

mod cloudinary;

pub use cloudinary::CloudinaryHost;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::CdnConfig;

#[derive(Debug, Error)]
pub enum CdnError {
    #[error("image host is not configured")]
    NotConfigured,

    #[error("request to image host failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("image host returned HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected image host response: {0}")]
    InvalidResponse(String),
}

/// A file about to be sent to the host.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub bytes: Vec<u8>,
    pub original_name: String,
    pub mimetype: String,
}

/// What the host reports back after a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct HostedAsset {
    /// Host-native id, used later to destroy the asset.
    pub public_id: String,
    pub url: String,
    pub size: u64,
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, asset: AssetUpload) -> Result<HostedAsset, CdnError>;

    async fn destroy(&self, public_id: &str) -> Result<(), CdnError>;
}

/// Stand-in used when no credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledHost;

#[async_trait]
impl ImageHost for DisabledHost {
    async fn upload(&self, _asset: AssetUpload) -> Result<HostedAsset, CdnError> {
        Err(CdnError::NotConfigured)
    }

    async fn destroy(&self, _public_id: &str) -> Result<(), CdnError> {
        Err(CdnError::NotConfigured)
    }
}

/// Builds the host for `config`, falling back to [`DisabledHost`] when
/// credentials are missing.
pub fn from_config(config: &CdnConfig) -> Result<Arc<dyn ImageHost>, CdnError> {
    if !config.is_configured() {
        tracing::warn!("Image host credentials not set; uploads are disabled");
        return Ok(Arc::new(DisabledHost));
    }
    Ok(Arc::new(CloudinaryHost::new(config)?))
}
