//! Property listing, search and mutation handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use homestead_query::SearchVariant;

use super::parse_id;
use crate::{
    api::{
        envelope::{DataEnvelope, ListEnvelope, MessageEnvelope},
        extractors::{ApiJson, QueryItems},
    },
    auth::{AdminPrincipal, AuthenticatedPrincipal},
    models::{
        CreatePropertyRequest, FeaturedImageRequest, ImageIdsRequest, PropertyView,
        UpdateImagesRequest, UpdatePropertyRequest,
    },
    state::AppState,
    Result,
};

const PROPERTY: &str = "Property";
const IMAGE: &str = "Image";

async fn run_search(
    state: &AppState,
    variant: SearchVariant,
    query: &QueryItems,
) -> Result<ListEnvelope<PropertyView>> {
    let page = state.search_service.search(variant, &query.0).await?;
    Ok(ListEnvelope::new(page.items, page.total, page.page))
}

/// GET /api/properties
pub async fn list_properties(
    State(state): State<AppState>,
    query: QueryItems,
) -> Result<impl IntoResponse> {
    run_search(&state, SearchVariant::List, &query).await
}

/// GET /api/properties/search
pub async fn quick_search(
    State(state): State<AppState>,
    query: QueryItems,
) -> Result<impl IntoResponse> {
    run_search(&state, SearchVariant::Quick, &query).await
}

/// GET /api/properties/search/advanced
pub async fn advanced_search(
    State(state): State<AppState>,
    query: QueryItems,
) -> Result<impl IntoResponse> {
    run_search(&state, SearchVariant::Advanced, &query).await
}

/// GET /api/properties/filter
pub async fn filter_properties(
    State(state): State<AppState>,
    query: QueryItems,
) -> Result<impl IntoResponse> {
    run_search(&state, SearchVariant::FilterOnly, &query).await
}

/// GET /api/properties/featured
pub async fn featured_properties(
    State(state): State<AppState>,
    query: QueryItems,
) -> Result<impl IntoResponse> {
    run_search(&state, SearchVariant::Featured, &query).await
}

/// GET /api/properties/mine - listings created by the caller, active or not.
pub async fn my_properties(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    query: QueryItems,
) -> Result<impl IntoResponse> {
    run_search(&state, SearchVariant::Owner(principal.subject), &query).await
}

pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(PROPERTY, &id)?;
    let view = state.property_service.get(id).await?;
    Ok(DataEnvelope::ok(view))
}

pub async fn create_property(
    State(state): State<AppState>,
    AdminPrincipal(principal): AdminPrincipal,
    ApiJson(request): ApiJson<CreatePropertyRequest>,
) -> Result<impl IntoResponse> {
    let view = state
        .property_service
        .create(&principal.subject, request)
        .await?;
    Ok(DataEnvelope::created(view).with_message("Property created successfully"))
}

pub async fn update_property(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdatePropertyRequest>,
) -> Result<impl IntoResponse> {
    let id = parse_id(PROPERTY, &id)?;
    let view = state.property_service.update(id, request).await?;
    Ok(DataEnvelope::ok(view).with_message("Property updated successfully"))
}

pub async fn delete_property(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(PROPERTY, &id)?;
    state.property_service.delete(id).await?;
    Ok(MessageEnvelope::new("Property deleted successfully"))
}

/// POST /api/properties/:id/images
pub async fn add_property_images(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ImageIdsRequest>,
) -> Result<impl IntoResponse> {
    let id = parse_id(PROPERTY, &id)?;
    let view = state
        .property_service
        .add_images(id, &request.image_ids)
        .await?;
    Ok(DataEnvelope::ok(view).with_message("Images added successfully"))
}

/// PATCH /api/properties/:id/images
pub async fn update_property_images(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateImagesRequest>,
) -> Result<impl IntoResponse> {
    let id = parse_id(PROPERTY, &id)?;
    let view = state.property_service.update_images(id, request).await?;
    Ok(DataEnvelope::ok(view).with_message("Images updated successfully"))
}

/// DELETE /api/properties/:id/images/:image_id
pub async fn remove_property_image(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path((id, image_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let id = parse_id(PROPERTY, &id)?;
    let image_id = parse_id(IMAGE, &image_id)?;
    let view = state.property_service.remove_image(id, image_id).await?;
    Ok(DataEnvelope::ok(view).with_message("Image removed successfully"))
}

/// PUT /api/properties/:id/featured-image
pub async fn set_featured_image(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<FeaturedImageRequest>,
) -> Result<impl IntoResponse> {
    let id = parse_id(PROPERTY, &id)?;
    let view = state
        .property_service
        .set_featured_image(id, request.image_id)
        .await?;
    Ok(DataEnvelope::ok(view).with_message("Featured image updated successfully"))
}
