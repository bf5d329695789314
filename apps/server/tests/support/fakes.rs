use async_trait::async_trait;
use homestead::cdn::{AssetUpload, CdnError, HostedAsset, ImageHost};
use std::sync::Mutex;

/// Image host that keeps everything in memory and records its calls.
#[derive(Default)]
pub struct RecordingHost {
    uploaded: Mutex<Vec<String>>,
    destroyed: Mutex<Vec<String>>,
    reject_uploads: bool,
    reject_name: Option<String>,
}

impl RecordingHost {
    /// A host answering every upload with an HTTP 502.
    pub fn rejecting() -> Self {
        Self {
            reject_uploads: true,
            ..Self::default()
        }
    }

    /// A host that accepts everything except the file called `name`.
    pub fn rejecting_file(name: &str) -> Self {
        Self {
            reject_name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().expect("uploaded lock").clone()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().expect("destroyed lock").clone()
    }
}

#[async_trait]
impl ImageHost for RecordingHost {
    async fn upload(&self, asset: AssetUpload) -> Result<HostedAsset, CdnError> {
        if self.reject_uploads || self.reject_name.as_deref() == Some(asset.original_name.as_str()) {
            return Err(CdnError::Rejected {
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        let mut uploaded = self.uploaded.lock().expect("uploaded lock");
        let public_id = format!("real-estate/test-{}", uploaded.len() + 1);
        uploaded.push(asset.original_name);
        Ok(HostedAsset {
            url: format!("https://cdn.example.org/{public_id}"),
            size: asset.bytes.len() as u64,
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), CdnError> {
        self.destroyed
            .lock()
            .expect("destroyed lock")
            .push(public_id.to_string());
        Ok(())
    }
}
