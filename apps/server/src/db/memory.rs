//! In-process store.
//!
//! Used when no database URL is configured and by the HTTP tests. Predicates
//! are evaluated against each record's JSON document, so results match what
//! the SQL rendering selects.

use async_trait::async_trait;
use homestead_query::{PagePlan, Predicate, SearchPlan, SortField, SortSpec};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::{PropertyStore, UploadStore};
use crate::{
    models::{PropertyRecord, UploadCategory, UploadRecord},
    Error, Result,
};

#[derive(Clone, Default)]
pub struct MemoryStore {
    properties: Arc<RwLock<HashMap<Uuid, PropertyRecord>>>,
    uploads: Arc<RwLock<HashMap<Uuid, UploadRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(
        properties: &HashMap<Uuid, PropertyRecord>,
        filter: &Predicate,
    ) -> Result<Vec<PropertyRecord>> {
        let mut out = Vec::new();
        for record in properties.values() {
            let doc = serde_json::to_value(record)?;
            if filter.matches(&doc) {
                out.push(record.clone());
            }
        }
        Ok(out)
    }
}

fn numeric_key(record: &PropertyRecord, field: SortField) -> Option<f64> {
    let specs = &record.listing.specifications;
    match field {
        SortField::Price => Some(record.listing.price),
        SortField::Area => Some(specs.area),
        SortField::Bedrooms => Some(f64::from(specs.bedrooms)),
        SortField::CreatedAt | SortField::UpdatedAt => None,
    }
}

fn compare(a: &PropertyRecord, b: &PropertyRecord, sort: SortSpec) -> Ordering {
    let primary = match sort.field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        field => {
            let (x, y) = (numeric_key(a, field), numeric_key(b, field));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
    };
    let primary = if sort.order.is_ascending() {
        primary
    } else {
        primary.reverse()
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn page_of<T>(items: Vec<T>, page: PagePlan) -> Vec<T> {
    let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(limit).collect()
}

#[async_trait]
impl PropertyStore for MemoryStore {
    async fn find_properties(&self, plan: &SearchPlan) -> Result<Vec<PropertyRecord>> {
        let properties = self.properties.read().await;
        let mut matching = Self::matching(&properties, &plan.filter)?;
        matching.sort_by(|a, b| compare(a, b, plan.sort));
        Ok(page_of(matching, plan.page))
    }

    async fn count_properties(&self, filter: &Predicate) -> Result<u64> {
        let properties = self.properties.read().await;
        Ok(Self::matching(&properties, filter)?.len() as u64)
    }

    async fn get_property(&self, id: Uuid) -> Result<Option<PropertyRecord>> {
        Ok(self.properties.read().await.get(&id).cloned())
    }

    async fn insert_property(&self, record: &PropertyRecord) -> Result<()> {
        let mut properties = self.properties.write().await;
        if properties.contains_key(&record.id) {
            return Err(Error::Conflict(format!(
                "Property {} already exists",
                record.id
            )));
        }
        properties.insert(record.id, record.clone());
        Ok(())
    }

    async fn replace_property(&self, record: &PropertyRecord) -> Result<bool> {
        let mut properties = self.properties.write().await;
        match properties.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_property(&self, id: Uuid) -> Result<bool> {
        Ok(self.properties.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl UploadStore for MemoryStore {
    async fn insert_upload(&self, record: &UploadRecord) -> Result<()> {
        self.uploads.write().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn get_upload(&self, id: Uuid) -> Result<Option<UploadRecord>> {
        Ok(self.uploads.read().await.get(&id).cloned())
    }

    async fn load_uploads_batch(&self, ids: &[Uuid]) -> Result<Vec<UploadRecord>> {
        let uploads = self.uploads.read().await;
        Ok(ids.iter().filter_map(|id| uploads.get(id).cloned()).collect())
    }

    async fn list_uploads(
        &self,
        category: Option<UploadCategory>,
        page: PagePlan,
    ) -> Result<(Vec<UploadRecord>, u64)> {
        let uploads = self.uploads.read().await;
        let mut matching: Vec<UploadRecord> = uploads
            .values()
            .filter(|u| category.map_or(true, |c| u.category == c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        let total = matching.len() as u64;
        Ok((page_of(matching, page), total))
    }

    async fn delete_upload(&self, id: Uuid) -> Result<bool> {
        Ok(self.uploads.write().await.remove(&id).is_some())
    }
}
