use serde::{Deserialize, Serialize};

use shared_models::clinical::StaffRole;
use shared_store::repository::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProviderRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: StaffRole,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Queue provisioning failed: {0}")]
    ProvisioningError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<StoreError> for ProviderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ProviderError::NotFound,
            StoreError::Conflict(msg) => ProviderError::ValidationError(msg),
            StoreError::Backend(msg) => ProviderError::StorageError(msg),
        }
    }
}
