//! Record Drafts
//!
//! The plaintext document a front end seals into a record's payload.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::Category;

/// Plaintext submission document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDraft {
    /// Material category
    pub category: Category,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Encoded image data (data URL or base64)
    #[serde(default)]
    pub image_data: String,
    /// Draft time, unix millis
    pub timestamp: i64,
}

impl RecordDraft {
    pub fn new(category: Category, description: impl Into<String>) -> Self {
        Self {
            category,
            description: description.into(),
            image_data: String::new(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Attach encoded image data
    pub fn with_image_data(mut self, image_data: impl Into<String>) -> Self {
        self.image_data = image_data.into();
        self
    }

    /// Plaintext bytes handed to the codec
    pub fn to_payload(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Parse a disclosed payload back into a draft
    pub fn from_payload(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}
