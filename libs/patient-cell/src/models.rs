use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_store::repository::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<StoreError> for PatientError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => PatientError::NotFound,
            StoreError::Conflict(msg) => PatientError::ValidationError(msg),
            StoreError::Backend(msg) => PatientError::StorageError(msg),
        }
    }
}
