//! Storage seams for listings and uploads
//!
//! Any backend (PostgreSQL, in-memory, ...) can serve the API by
//! implementing these two traits.

use async_trait::async_trait;
use homestead_query::{PagePlan, Predicate, SearchPlan};
use uuid::Uuid;

use crate::{
    models::{PropertyRecord, UploadCategory, UploadRecord},
    Result,
};

#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// One page of properties matching `plan.filter`, ordered by `plan.sort`.
    async fn find_properties(&self, plan: &SearchPlan) -> Result<Vec<PropertyRecord>>;

    /// Number of properties matching `filter`, ignoring pagination.
    async fn count_properties(&self, filter: &Predicate) -> Result<u64>;

    async fn get_property(&self, id: Uuid) -> Result<Option<PropertyRecord>>;

    async fn insert_property(&self, record: &PropertyRecord) -> Result<()>;

    /// Overwrites the stored document. Returns `false` when `record.id` is
    /// unknown.
    async fn replace_property(&self, record: &PropertyRecord) -> Result<bool>;

    /// Hard delete. Returns `false` when nothing was deleted.
    async fn delete_property(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait UploadStore: Send + Sync {
    async fn insert_upload(&self, record: &UploadRecord) -> Result<()>;

    async fn get_upload(&self, id: Uuid) -> Result<Option<UploadRecord>>;

    /// Loads every upload in `ids` with a single query. Unknown ids are
    /// skipped; order is unspecified.
    async fn load_uploads_batch(&self, ids: &[Uuid]) -> Result<Vec<UploadRecord>>;

    /// Newest first, with the total number of matching uploads.
    async fn list_uploads(
        &self,
        category: Option<UploadCategory>,
        page: PagePlan,
    ) -> Result<(Vec<UploadRecord>, u64)>;

    async fn delete_upload(&self, id: Uuid) -> Result<bool>;
}
