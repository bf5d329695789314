//! Upload routes, mounted at `/api/upload`.

use crate::api::handlers::uploads;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(uploads::list_uploads).post(uploads::upload_single))
        .route("/multiple", post(uploads::upload_multiple))
        .route(
            "/:id",
            get(uploads::get_upload).delete(uploads::delete_upload),
        )
}
