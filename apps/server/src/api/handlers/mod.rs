//! Request handlers for API endpoints
//!
//! Handlers extract and check request input, call into the services and
//! wrap results in the response envelopes.

pub mod metrics;
pub mod properties;
pub mod uploads;

use uuid::Uuid;

use crate::Error;

/// Parses a path id. Malformed ids cannot name a stored entity, so they
/// answer 404 like unknown ones.
pub(crate) fn parse_id(resource: &'static str, raw: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::not_found(resource, raw))
}
