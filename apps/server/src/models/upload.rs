//! Stored binary assets held by the external image host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recorded in `uploadedBy` when the uploader was not authenticated.
pub const ANONYMOUS_UPLOADER: &str = "anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UploadCategory {
    Property,
    Blog,
    Profile,
    Document,
    #[default]
    Other,
}

impl UploadCategory {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "property" => Some(Self::Property),
            "blog" => Some(Self::Blog),
            "profile" => Some(Self::Profile),
            "document" => Some(Self::Document),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Blog => "blog",
            Self::Profile => "profile",
            Self::Document => "document",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub id: Uuid,
    /// Public id assigned by the host.
    pub filename: String,
    pub original_name: String,
    pub mimetype: String,
    pub size: u64,
    pub url: String,
    pub cloudinary_id: String,
    pub uploaded_by: String,
    #[serde(default)]
    pub category: UploadCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Form fields sent along with uploaded files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadMetadata {
    pub category: UploadCategory,
    pub tags: Vec<String>,
    pub description: Option<String>,
}

impl UploadMetadata {
    /// Splits a comma-separated tag list, dropping empty entries.
    pub fn parse_tags(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }
}
