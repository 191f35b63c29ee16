//! Area persistence collaborator: wire types and the async trait seam.
//!
//! The collaborator speaks a flat camelCase JSON dialect. Every change goes
//! through one save endpoint; `drawingStatus` says whether the payload is an
//! insert, an update or a delete. [`AreaRepository`] is what the sync layer
//! talks to, so reconciliation can be tested against an in-memory mock.

#[cfg(test)]
#[path = "repository_test.rs"]
mod repository_test;

use serde::{Deserialize, Serialize, Serializer};

// =============================================================================
// WIRE TYPES
// =============================================================================

/// One stored vertex. `point_order` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateRecord {
    pub point_order: u32,
    pub x: f64,
    pub y: f64,
}

/// An area as listed by the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRecord {
    pub area_id: i64,
    #[serde(default)]
    pub area_nm: Option<String>,
    #[serde(default)]
    pub area_desc: Option<String>,
    #[serde(default)]
    pub area_color: Option<String>,
    #[serde(default)]
    pub coordinates: Vec<CoordinateRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawingStatus {
    #[serde(rename = "I")]
    Insert,
    #[serde(rename = "U")]
    Update,
    #[serde(rename = "D")]
    Delete,
}

/// Target of a save: one stored area, or every area of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaKey {
    Id(i64),
    All,
}

impl Serialize for AreaKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Id(id) => serializer.serialize_i64(*id),
            Self::All => serializer.serialize_str("ALL"),
        }
    }
}

/// Body of a save request. Absent fields are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<AreaKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_nm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_style: Option<String>,
    pub drawing_status: DrawingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Vec<CoordinateRecord>>,
}

impl AreaDelta {
    /// An empty delta carrying only its status.
    #[must_use]
    pub fn new(drawing_status: DrawingStatus) -> Self {
        Self {
            model_id: None,
            area_id: None,
            area_nm: None,
            area_desc: None,
            area_color: None,
            area_size: None,
            area_style: None,
            drawing_status,
            coordinates: None,
        }
    }
}

/// Reply to a save. Inserts carry the assigned id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub success: bool,
    #[serde(default)]
    pub area_id: Option<i64>,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Request(String),

    /// The collaborator answered with a non-success HTTP status.
    #[error("collaborator returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The collaborator answered `success: false`.
    #[error("collaborator rejected the request")]
    Rejected,
}

// =============================================================================
// TRAIT
// =============================================================================

/// Stored-area collaborator. Enables mocking in tests.
#[async_trait::async_trait]
pub trait AreaRepository: Send + Sync {
    /// List every stored area of a model.
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if the request fails or is rejected.
    async fn list(&self, model_id: &str) -> Result<Vec<AreaRecord>, RepositoryError>;

    /// Apply one insert, update or delete.
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if the request fails or is rejected.
    async fn save(&self, delta: &AreaDelta) -> Result<SaveReceipt, RepositoryError>;
}

// =============================================================================
// TEST HELPERS
// =============================================================================
