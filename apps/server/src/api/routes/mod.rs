//! API route tables

pub mod metrics;
pub mod properties;
pub mod uploads;
