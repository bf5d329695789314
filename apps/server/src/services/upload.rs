//! Upload pipeline: validate, push to the image host, then persist.
//!
//! The local record is written only after the host accepted the file. If
//! persisting fails the remote asset is destroyed on a best-effort basis;
//! a failure there leaves an orphan on the host, which is logged.
//!
//! Batches are all or nothing: when any file fails, the files that did get
//! stored are destroyed on the host and their records removed.

use chrono::Utc;
use futures::future::join_all;
use homestead_query::PagePlan;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    cdn::{AssetUpload, ImageHost},
    config::UploadConfig,
    db::UploadStore,
    models::{UploadCategory, UploadMetadata, UploadRecord},
    Error, Result,
};

const UPLOAD: &str = "Upload";

/// A file as read from a multipart body.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub mimetype: String,
    pub bytes: Vec<u8>,
}

pub struct UploadService {
    uploads: Arc<dyn UploadStore>,
    host: Arc<dyn ImageHost>,
    limits: UploadConfig,
}

impl UploadService {
    pub fn new(uploads: Arc<dyn UploadStore>, host: Arc<dyn ImageHost>, limits: UploadConfig) -> Self {
        Self {
            uploads,
            host,
            limits,
        }
    }

    pub fn max_files(&self) -> usize {
        self.limits.max_files
    }

    pub fn validate_file(&self, file: &IncomingFile) -> Result<()> {
        if file.bytes.is_empty() {
            return Err(Error::Validation(format!(
                "File '{}' is empty",
                file.original_name
            )));
        }
        if !self
            .limits
            .allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&file.mimetype))
        {
            return Err(Error::Validation(format!(
                "File type '{}' is not allowed",
                file.mimetype
            )));
        }
        if file.bytes.len() > self.limits.max_file_size_bytes {
            return Err(Error::Validation(format!(
                "File '{}' exceeds the maximum size of {} bytes",
                file.original_name, self.limits.max_file_size_bytes
            )));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, file, metadata), fields(name = %file.original_name))]
    pub async fn upload(
        &self,
        uploaded_by: &str,
        file: IncomingFile,
        metadata: &UploadMetadata,
    ) -> Result<UploadRecord> {
        self.validate_file(&file)?;
        self.store_file(uploaded_by, file, metadata).await
    }

    /// Validates every file before sending any of them.
    pub async fn upload_many(
        &self,
        uploaded_by: &str,
        files: Vec<IncomingFile>,
        metadata: &UploadMetadata,
    ) -> Result<Vec<UploadRecord>> {
        if files.is_empty() {
            return Err(Error::Validation("No files uploaded".to_string()));
        }
        if files.len() > self.limits.max_files {
            return Err(Error::Validation(format!(
                "At most {} files can be uploaded at once",
                self.limits.max_files
            )));
        }
        for file in &files {
            self.validate_file(file)?;
        }

        let results = join_all(
            files
                .into_iter()
                .map(|file| self.store_file(uploaded_by, file, metadata)),
        )
        .await;

        let mut stored = Vec::with_capacity(results.len());
        let mut failure = None;
        for result in results {
            match result {
                Ok(record) => stored.push(record),
                Err(err) if failure.is_none() => failure = Some(err),
                Err(err) => tracing::warn!(error = %err, "Another file in the batch failed"),
            }
        }

        match failure {
            Some(err) => {
                self.roll_back(&stored).await;
                Err(err)
            }
            None => Ok(stored),
        }
    }

    /// Removes the stored part of a failed batch. Cleanup failures are
    /// logged and otherwise ignored.
    async fn roll_back(&self, stored: &[UploadRecord]) {
        for record in stored {
            if let Err(err) = self.host.destroy(&record.cloudinary_id).await {
                tracing::warn!(
                    public_id = %record.cloudinary_id,
                    error = %err,
                    "Failed to remove asset of a failed batch"
                );
            }
            if let Err(err) = self.uploads.delete_upload(record.id).await {
                tracing::warn!(
                    upload_id = %record.id,
                    error = %err,
                    "Failed to remove record of a failed batch"
                );
            }
        }
        tracing::info!(rolled_back = stored.len(), "Upload batch rolled back");
    }

    pub async fn get(&self, id: Uuid) -> Result<UploadRecord> {
        self.uploads
            .get_upload(id)
            .await?
            .ok_or_else(|| Error::not_found(UPLOAD, id))
    }

    pub async fn list(
        &self,
        category: Option<UploadCategory>,
        page: PagePlan,
    ) -> Result<(Vec<UploadRecord>, u64)> {
        self.uploads.list_uploads(category, page).await
    }

    /// Destroys the hosted asset, then the record.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let record = self.get(id).await?;
        self.host.destroy(&record.cloudinary_id).await?;
        self.uploads.delete_upload(id).await?;
        tracing::info!(upload_id = %id, "Upload deleted");
        Ok(())
    }

    async fn store_file(
        &self,
        uploaded_by: &str,
        file: IncomingFile,
        metadata: &UploadMetadata,
    ) -> Result<UploadRecord> {
        let hosted = self
            .host
            .upload(AssetUpload {
                bytes: file.bytes,
                original_name: file.original_name.clone(),
                mimetype: file.mimetype.clone(),
            })
            .await?;

        let record = UploadRecord {
            id: Uuid::new_v4(),
            filename: hosted.public_id.clone(),
            original_name: file.original_name,
            mimetype: file.mimetype,
            size: hosted.size,
            url: hosted.url,
            cloudinary_id: hosted.public_id,
            uploaded_by: uploaded_by.to_string(),
            category: metadata.category,
            tags: metadata.tags.clone(),
            description: metadata.description.clone(),
            created_at: Utc::now(),
        };

        if let Err(err) = self.uploads.insert_upload(&record).await {
            if let Err(cleanup) = self.host.destroy(&record.cloudinary_id).await {
                tracing::warn!(
                    public_id = %record.cloudinary_id,
                    error = %cleanup,
                    "Failed to remove orphaned asset after persist failure"
                );
            }
            return Err(err);
        }

        tracing::info!(upload_id = %record.id, public_id = %record.cloudinary_id, "Upload stored");
        Ok(record)
    }
}
