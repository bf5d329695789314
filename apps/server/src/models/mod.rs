//! Domain models for listings and uploads

pub mod property;
pub mod upload;

pub use property::{
    Amenity, AreaUnit, Coordinates, CreatePropertyRequest, Currency, FeaturedImageRequest,
    ImageAction, ImageIdsRequest, ImageNotAttached, Listing, ListingStatus, Location,
    PropertyRecord, PropertyType, PropertyView, Specifications, UpdateImagesRequest,
    UpdatePropertyRequest,
};
pub use upload::{UploadCategory, UploadMetadata, UploadRecord, ANONYMOUS_UPLOADER};
