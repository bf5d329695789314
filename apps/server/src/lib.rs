//! Homestead - real-estate listing API
//!
//! - Property search over a JSON document store, driven by
//!   [`homestead_query`] plans
//! - Listing management with image galleries for admins
//! - File uploads pushed to an external image host

#![allow(
    clippy::too_many_arguments,      // Handlers take one argument per extractor
    clippy::large_enum_variant,      // Error variants wrap third-party errors as-is
)]

pub mod api;
pub mod auth;
pub mod cdn;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod request_context;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
