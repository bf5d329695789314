//! Cloudinary upload API client.
//!
//! Requests are signed: the non-file parameters are sorted by name, joined
//! as `k=v&k=v`, suffixed with the API secret and hashed with SHA-256.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

use super::{AssetUpload, CdnError, HostedAsset, ImageHost};
use crate::config::CdnConfig;
use crate::metrics::IMAGE_HOST_REQUESTS_TOTAL;

#[derive(Clone)]
pub struct CloudinaryHost {
    http: reqwest::Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
    #[serde(default)]
    bytes: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryHost {
    pub fn new(config: &CdnConfig) -> Result<Self, CdnError> {
        let (Some(cloud_name), Some(api_key), Some(api_secret)) = (
            config.cloud_name.clone(),
            config.api_key.clone(),
            config.api_secret.clone(),
        ) else {
            return Err(CdnError::NotConfigured);
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cloud_name,
            api_key,
            api_secret,
            folder: config.folder.clone(),
        })
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url, self.cloud_name, resource_type, action
        )
    }

    fn sign(&self, params: &[(&str, String)]) -> String {
        sign_params(params, &self.api_secret)
    }

    async fn read_error(response: reqwest::Response) -> CdnError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => "no error message".to_string(),
        };
        CdnError::Rejected { status, message }
    }
}

/// Signature over `params` (excluding `file`, `api_key` and `resource_type`).
pub(crate) fn sign_params(params: &[(&str, String)], secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn record_outcome(operation: &str, ok: bool) {
    IMAGE_HOST_REQUESTS_TOTAL
        .with_label_values(&[operation, if ok { "success" } else { "error" }])
        .inc();
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    #[tracing::instrument(skip_all, fields(name = %asset.original_name, size = asset.bytes.len()))]
    async fn upload(&self, asset: AssetUpload) -> Result<HostedAsset, CdnError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let params = [
            ("folder", self.folder.clone()),
            ("timestamp", timestamp.clone()),
        ];
        let signature = self.sign(&params);
        let fallback_size = asset.bytes.len() as u64;

        let part = Part::bytes(asset.bytes)
            .file_name(asset.original_name)
            .mime_str(&asset.mimetype)?;
        let form = Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("folder", self.folder.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let result: Result<HostedAsset, CdnError> = async {
            let response = self
                .http
                .post(self.endpoint("auto", "upload"))
                .multipart(form)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(Self::read_error(response).await);
            }
            let body: UploadResponse = response
                .json()
                .await
                .map_err(|e| CdnError::InvalidResponse(e.to_string()))?;
            Ok(HostedAsset {
                public_id: body.public_id,
                url: body.secure_url,
                size: body.bytes.unwrap_or(fallback_size),
            })
        }
        .await;

        record_outcome("upload", result.is_ok());
        if let Ok(asset) = &result {
            tracing::debug!(public_id = %asset.public_id, "Asset uploaded");
        }
        result
    }

    #[tracing::instrument(skip(self))]
    async fn destroy(&self, public_id: &str) -> Result<(), CdnError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let params = [
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp.clone()),
        ];
        let signature = self.sign(&params);

        let form = [
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp),
            ("api_key", self.api_key.clone()),
            ("signature", signature),
            ("signature_algorithm", "sha256".to_string()),
        ];

        let result: Result<(), CdnError> = async {
            let response = self
                .http
                .post(self.endpoint("image", "destroy"))
                .form(&form)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(Self::read_error(response).await);
            }
            let body: DestroyResponse = response
                .json()
                .await
                .map_err(|e| CdnError::InvalidResponse(e.to_string()))?;
            match body.result.as_str() {
                // Already gone on the host side.
                "ok" | "not found" => Ok(()),
                other => Err(CdnError::InvalidResponse(format!(
                    "destroy returned '{other}'"
                ))),
            }
        }
        .await;

        record_outcome("destroy", result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_sorts_params_and_skips_empty_values() {
        let a = sign_params(
            &[("timestamp", "1700000000".into()), ("folder", "homes".into())],
            "secret",
        );
        let b = sign_params(
            &[
                ("folder", "homes".into()),
                ("tags", String::new()),
                ("timestamp", "1700000000".into()),
            ],
            "secret",
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let expected = hex::encode(Sha256::digest(
            b"folder=homes&timestamp=1700000000secret",
        ));
        assert_eq!(a, expected);
    }

    #[test]
    fn host_requires_credentials() {
        assert!(matches!(
            CloudinaryHost::new(&CdnConfig::default()),
            Err(CdnError::NotConfigured)
        ));
    }

    #[test]
    fn endpoint_joins_cloud_and_action() {
        let config = CdnConfig {
            cloud_name: Some("demo".into()),
            api_key: Some("key".into()),
            api_secret: Some("secret".into()),
            base_url: "https://api.example.test/v1_1/".into(),
            ..CdnConfig::default()
        };
        let host = CloudinaryHost::new(&config).unwrap();
        assert_eq!(
            host.endpoint("auto", "upload"),
            "https://api.example.test/v1_1/demo/auto/upload"
        );
    }
}
