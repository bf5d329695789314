//! Property routes, mounted at `/api/properties`.
//!
//! Fixed segments such as `/search` and `/featured` are registered
//! alongside `/:id`; axum prefers static segments over captures.

use crate::api::handlers::properties;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub fn property_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(properties::list_properties).post(properties::create_property),
        )
        .route("/search", get(properties::quick_search))
        .route("/search/advanced", get(properties::advanced_search))
        .route("/filter", get(properties::filter_properties))
        .route("/featured", get(properties::featured_properties))
        .route("/mine", get(properties::my_properties))
        .route(
            "/:id",
            get(properties::get_property)
                .put(properties::update_property)
                .delete(properties::delete_property),
        )
        .route(
            "/:id/images",
            post(properties::add_property_images).patch(properties::update_property_images),
        )
        .route(
            "/:id/images/:image_id",
            delete(properties::remove_property_image),
        )
        .route("/:id/featured-image", put(properties::set_featured_image))
}
