use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use appointment_cell::models::AppointmentError;
use shared_models::clinical::{Appointment, QueueKind};
use shared_store::repository::StoreError;

// ==============================================================================
// DESTINATIONS
// ==============================================================================

/// Symbolic routing tag for queue placement. Closed set: unrecognized tags
/// are rejected at the transport boundary rather than ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Destination {
    /// Routes to the shared "Pre-Exam" queue.
    #[serde(rename = "PREEXAM")]
    PreExam,

    /// Routes to the shared "Pre-Operation" queue.
    #[serde(rename = "PREOPERATION")]
    PreOperation,

    /// Routes to the personal queue of the appointment's assigned provider.
    #[serde(rename = "PHYSICIAN")]
    Physician,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::PreExam => write!(f, "PREEXAM"),
            Destination::PreOperation => write!(f, "PREOPERATION"),
            Destination::Physician => write!(f, "PHYSICIAN"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub appointment_id: Uuid,
    pub destination: Destination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutRequest {
    pub appointment_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRequest {
    pub appointment_id: Uuid,
    pub destination: Destination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub appointment_id: Uuid,
    pub source_queue_id: Uuid,
    pub destination_queue_id: Uuid,
}

/// A queue hydrated for display: ordered appointment records instead of
/// bare ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueView {
    pub id: Uuid,
    pub name: String,
    pub kind: QueueKind,
    pub appointments: Vec<Appointment>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Queue not found")]
    QueueNotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Provider not found")]
    ProviderNotFound,

    #[error("Appointment {appointment_id} is not in queue {queue_id}")]
    NotQueued {
        queue_id: Uuid,
        appointment_id: Uuid,
    },

    #[error(transparent)]
    Lifecycle(#[from] AppointmentError),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<StoreError> for QueueError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => QueueError::NotFound(msg),
            StoreError::Conflict(msg) => QueueError::ValidationError(msg),
            StoreError::Backend(msg) => QueueError::StorageError(msg),
        }
    }
}
