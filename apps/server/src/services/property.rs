//! Property creation, updates and image sub-operations.
//!
//! Every mutation is read-modify-write on a single document without
//! optimistic locking; two concurrent image edits on the same property can
//! lose one of the updates.

use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::search::resolve_views;
use crate::{
    db::{PropertyStore, UploadStore},
    models::{
        CreatePropertyRequest, ImageAction, PropertyRecord, PropertyView,
        UpdateImagesRequest, UpdatePropertyRequest,
    },
    Error, Result,
};

const PROPERTY: &str = "Property";

pub struct PropertyService {
    properties: Arc<dyn PropertyStore>,
    uploads: Arc<dyn UploadStore>,
}

impl PropertyService {
    pub fn new(properties: Arc<dyn PropertyStore>, uploads: Arc<dyn UploadStore>) -> Self {
        Self {
            properties,
            uploads,
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<PropertyView> {
        let record = self.load(id).await?;
        self.view(record).await
    }

    #[tracing::instrument(skip(self, request), fields(title = %request.listing.title))]
    pub async fn create(&self, owner: &str, request: CreatePropertyRequest) -> Result<PropertyView> {
        request.listing.validate()?;

        let mut referenced = request.images.clone();
        referenced.extend(request.featured_image);
        self.ensure_uploads_exist(&referenced).await?;

        let mut record = PropertyRecord::new(request.listing, owner, request.agent_id);
        record.replace_images(request.images);
        if let Some(featured) = request.featured_image {
            record.set_featured_image(featured)?;
        }

        self.properties.insert_property(&record).await?;
        tracing::info!(property_id = %record.id, "Property created");

        self.view(record).await
    }

    /// Partial update: absent fields keep their stored value.
    #[tracing::instrument(skip(self, request))]
    pub async fn update(&self, id: Uuid, request: UpdatePropertyRequest) -> Result<PropertyView> {
        let mut record = self.load(id).await?;

        request.apply_to(&mut record.listing);
        record.listing.validate()?;

        if let Some(agent_id) = request.agent_id {
            record.agent_id = agent_id;
        }

        let mut referenced = request.images.clone().unwrap_or_default();
        referenced.extend(request.featured_image.flatten());
        self.ensure_uploads_exist(&referenced).await?;

        if let Some(images) = request.images {
            record.replace_images(images);
        }
        match request.featured_image {
            Some(Some(featured)) => record.set_featured_image(featured)?,
            Some(None) => record.featured_image = None,
            None => {}
        }

        self.save(&mut record).await?;
        tracing::info!(property_id = %id, "Property updated");
        self.view(record).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.properties.delete_property(id).await? {
            return Err(Error::not_found(PROPERTY, id));
        }
        tracing::info!(property_id = %id, "Property deleted");
        Ok(())
    }

    /// Appends uploads to the gallery and features the first image when
    /// nothing is featured yet.
    pub async fn add_images(&self, id: Uuid, image_ids: &[Uuid]) -> Result<PropertyView> {
        require_ids(image_ids)?;
        let mut record = self.load(id).await?;
        self.ensure_uploads_exist(image_ids).await?;

        let added = record.append_images(image_ids);
        record.feature_first_image_if_unset();

        self.save(&mut record).await?;
        tracing::debug!(property_id = %id, added, "Images added");
        self.view(record).await
    }

    /// Bulk add/remove. Adding here never sets the featured image.
    pub async fn update_images(
        &self,
        id: Uuid,
        request: UpdateImagesRequest,
    ) -> Result<PropertyView> {
        require_ids(&request.image_ids)?;
        let mut record = self.load(id).await?;

        match request.action {
            ImageAction::Add => {
                self.ensure_uploads_exist(&request.image_ids).await?;
                record.append_images(&request.image_ids);
            }
            ImageAction::Remove => {
                record.remove_images(&request.image_ids);
            }
        }

        self.save(&mut record).await?;
        self.view(record).await
    }

    pub async fn remove_image(&self, id: Uuid, image_id: Uuid) -> Result<PropertyView> {
        let mut record = self.load(id).await?;
        if record.remove_images(&[image_id]) == 0 {
            return Err(Error::not_found("Image", image_id));
        }
        self.save(&mut record).await?;
        self.view(record).await
    }

    pub async fn set_featured_image(&self, id: Uuid, image_id: Uuid) -> Result<PropertyView> {
        let mut record = self.load(id).await?;
        record.set_featured_image(image_id)?;
        self.save(&mut record).await?;
        self.view(record).await
    }

    async fn load(&self, id: Uuid) -> Result<PropertyRecord> {
        self.properties
            .get_property(id)
            .await?
            .ok_or_else(|| Error::not_found(PROPERTY, id))
    }

    async fn save(&self, record: &mut PropertyRecord) -> Result<()> {
        record.touch();
        if !self.properties.replace_property(record).await? {
            // Deleted between load and save.
            return Err(Error::not_found(PROPERTY, record.id));
        }
        Ok(())
    }

    async fn view(&self, record: PropertyRecord) -> Result<PropertyView> {
        let mut views = resolve_views(self.uploads.as_ref(), vec![record]).await?;
        views
            .pop()
            .ok_or_else(|| Error::Internal("property view could not be built".to_string()))
    }

    /// Rejects references to uploads that do not exist.
    async fn ensure_uploads_exist(&self, ids: &[Uuid]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut wanted: Vec<Uuid> = Vec::with_capacity(ids.len());
        let mut seen = HashSet::new();
        for id in ids {
            if seen.insert(*id) {
                wanted.push(*id);
            }
        }

        let found: HashSet<Uuid> = self
            .uploads
            .load_uploads_batch(&wanted)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();

        let missing: Vec<String> = wanted
            .iter()
            .filter(|id| !found.contains(id))
            .map(Uuid::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "Unknown image ids: {}",
                missing.join(", ")
            )))
        }
    }
}

fn require_ids(ids: &[Uuid]) -> Result<()> {
    if ids.is_empty() {
        return Err(Error::Validation("imageIds must not be empty".to_string()));
    }
    Ok(())
}
