//! Property listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::upload::UploadRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    House,
    Apartment,
    Condo,
    Villa,
    Townhouse,
    Land,
    Commercial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ListingStatus {
    #[default]
    ForSale,
    ForRent,
    Sold,
    Rented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
    Inr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AreaUnit {
    #[default]
    Sqft,
    Sqm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Amenity {
    Pool,
    Gym,
    Parking,
    Garden,
    Balcony,
    AirConditioning,
    Heating,
    Security,
    Elevator,
    Furnished,
    PetFriendly,
    Fireplace,
    Laundry,
    Internet,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinates {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "Zip code is required"))]
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub coordinates: Option<Coordinates>,
}

fn default_country() -> String {
    "USA".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    pub bedrooms: u32,
    pub bathrooms: u32,
    #[validate(range(min = 0.0, message = "Area cannot be negative"))]
    pub area: f64,
    #[serde(default)]
    pub area_unit: AreaUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1800, max = 2100, message = "Year built must be between 1800 and 2100"))]
    pub year_built: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floors: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking: Option<u32>,
}

/// Descriptive part of a listing, shared by stored records, views and
/// create requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Description must be between 1 and 2000 characters"
    ))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default)]
    pub status: ListingStatus,
    #[validate(nested)]
    pub location: Location,
    #[validate(nested)]
    pub specifications: Specifications,
    #[serde(default)]
    pub amenities: Vec<Amenity>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub featured: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub listing: Listing,
    /// Upload ids in display order.
    pub images: Vec<Uuid>,
    /// Always one of `images` when set.
    pub featured_image: Option<Uuid>,
    pub created_by: String,
    pub agent_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Returned when a featured image is not attached to the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageNotAttached(pub Uuid);

impl PropertyRecord {
    pub fn new(listing: Listing, owner: &str, agent_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            listing,
            images: Vec::new(),
            featured_image: None,
            created_by: owner.to_string(),
            agent_id: agent_id.unwrap_or_else(|| owner.to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Appends ids that are not attached yet, preserving request order.
    /// Returns how many were appended. `featured_image` is left alone.
    pub fn append_images(&mut self, ids: &[Uuid]) -> usize {
        let before = self.images.len();
        for id in ids {
            if !self.images.contains(id) {
                self.images.push(*id);
            }
        }
        self.images.len() - before
    }

    /// Promotes the first image to featured when none is set.
    pub fn feature_first_image_if_unset(&mut self) {
        if self.featured_image.is_none() {
            self.featured_image = self.images.first().copied();
        }
    }

    /// Detaches `ids`; returns how many were removed.
    pub fn remove_images(&mut self, ids: &[Uuid]) -> usize {
        let before = self.images.len();
        self.images.retain(|id| !ids.contains(id));
        self.reconcile_featured_image();
        before - self.images.len()
    }

    /// Replaces the whole image list, keeping the featured image valid.
    pub fn replace_images(&mut self, ids: Vec<Uuid>) {
        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        self.images = unique;
        self.reconcile_featured_image();
    }

    pub fn set_featured_image(&mut self, id: Uuid) -> Result<(), ImageNotAttached> {
        if !self.images.contains(&id) {
            return Err(ImageNotAttached(id));
        }
        self.featured_image = Some(id);
        Ok(())
    }

    /// A featured image that is no longer attached falls back to the first
    /// image, or to none when the list is empty.
    fn reconcile_featured_image(&mut self) {
        if let Some(featured) = self.featured_image {
            if !self.images.contains(&featured) {
                self.featured_image = self.images.first().copied();
            }
        }
    }
}

/// Property with its image references resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyView {
    pub id: Uuid,
    #[serde(flatten)]
    pub listing: Listing,
    pub images: Vec<UploadRecord>,
    pub featured_image: Option<UploadRecord>,
    pub created_by: String,
    pub agent_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyView {
    /// Builds the view from `record`, picking uploads out of `lookup`.
    /// References without a matching upload are dropped.
    pub fn resolve(
        record: PropertyRecord,
        lookup: &std::collections::HashMap<Uuid, UploadRecord>,
    ) -> Self {
        let images = record
            .images
            .iter()
            .filter_map(|id| lookup.get(id).cloned())
            .collect();
        let featured_image = record.featured_image.and_then(|id| lookup.get(&id).cloned());

        Self {
            id: record.id,
            listing: record.listing,
            images,
            featured_image,
            created_by: record.created_by,
            agent_id: record.agent_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    #[serde(flatten)]
    pub listing: Listing,
    #[serde(default)]
    pub images: Vec<Uuid>,
    #[serde(default)]
    pub featured_image: Option<Uuid>,
    #[serde(default)]
    pub agent_id: Option<String>,
}

/// Partial update. Absent fields are left untouched; nested objects are
/// replaced as a whole.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<Currency>,
    #[serde(rename = "type")]
    pub property_type: Option<PropertyType>,
    pub status: Option<ListingStatus>,
    pub location: Option<Location>,
    pub specifications: Option<Specifications>,
    pub amenities: Option<Vec<Amenity>>,
    pub images: Option<Vec<Uuid>>,
    /// `Some(None)` clears the featured image; `None` leaves it alone.
    #[serde(default, deserialize_with = "present_or_null")]
    pub featured_image: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
    pub featured: Option<bool>,
    pub agent_id: Option<String>,
}

/// Maps a field that is present, even as `null`, to `Some`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdatePropertyRequest {
    /// Applies the listing fields. Image fields are handled by the caller,
    /// which has to verify the references first.
    pub fn apply_to(&self, listing: &mut Listing) {
        if let Some(title) = &self.title {
            listing.title = title.clone();
        }
        if let Some(description) = &self.description {
            listing.description = description.clone();
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
        if let Some(currency) = self.currency {
            listing.currency = currency;
        }
        if let Some(property_type) = self.property_type {
            listing.property_type = property_type;
        }
        if let Some(status) = self.status {
            listing.status = status;
        }
        if let Some(location) = &self.location {
            listing.location = location.clone();
        }
        if let Some(specifications) = &self.specifications {
            listing.specifications = specifications.clone();
        }
        if let Some(amenities) = &self.amenities {
            listing.amenities = amenities.clone();
        }
        if let Some(is_active) = self.is_active {
            listing.is_active = is_active;
        }
        if let Some(featured) = self.featured {
            listing.featured = featured;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageIdsRequest {
    pub image_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageAction {
    Add,
    Remove,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImagesRequest {
    pub action: ImageAction,
    pub image_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedImageRequest {
    pub image_id: Uuid,
}
