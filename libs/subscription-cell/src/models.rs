use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::clinical::{Appointment, VisitType};
use shared_store::repository::StoreError;

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub queue_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeedQuery {
    pub search: Option<String>,
    pub visit_type: Option<VisitType>,
    /// Defaults to true; when false the provider fallback is used even if
    /// subscriptions exist.
    pub use_subscriptions: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// One feed row. Source queue tags are set on the subscription path so a
/// client can group rows by origin; the provider fallback carries none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub queue_id: Option<Uuid>,
    pub queue_name: Option<String>,
    pub appointment: Appointment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    pub entries: Vec<FeedEntry>,
    pub total: usize,
    pub offset: usize,
    /// True when the page came from the subscription aggregation rather
    /// than the provider fallback.
    pub from_subscriptions: bool,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("Queue not found")]
    QueueNotFound,

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<StoreError> for SubscriptionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => SubscriptionError::NotFound(msg),
            StoreError::Conflict(msg) => SubscriptionError::ValidationError(msg),
            StoreError::Backend(msg) => SubscriptionError::StorageError(msg),
        }
    }
}
