use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use queue_cell::services::orchestrator::QueueOrchestrator;
use shared_models::auth::User;
use shared_models::clinical::{Provider, StaffRole};
use shared_store::Datastore;

use crate::models::{CreateProviderRequest, ProviderError};

/// Staff directory. Creating a physician also provisions their personal
/// work queue.
pub struct ProviderDirectoryService {
    store: Datastore,
}

impl ProviderDirectoryService {
    pub fn new(store: Datastore) -> Self {
        Self { store }
    }

    pub async fn create_provider(
        &self,
        principal: &User,
        request: CreateProviderRequest,
    ) -> Result<Provider, ProviderError> {
        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(ProviderError::ValidationError(
                "Provider name must not be empty".to_string(),
            ));
        }
        if !request.email.contains('@') {
            return Err(ProviderError::ValidationError(
                "Provider email is malformed".to_string(),
            ));
        }

        let provider = Provider {
            id: Uuid::new_v4(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            role: request.role,
            created_at: Utc::now(),
        };

        self.store.providers.insert(&provider).await?;

        if provider.role == StaffRole::Physician {
            let orchestrator = QueueOrchestrator::new(self.store.clone());
            orchestrator
                .provision_physician_queue(&provider)
                .await
                .map_err(|e| ProviderError::ProvisioningError(e.to_string()))?;
        }

        info!(
            "Provider {} ({}) created by {}",
            provider.full_name(),
            provider.role,
            principal.id
        );
        Ok(provider)
    }

    pub async fn get(&self, provider_id: Uuid) -> Result<Provider, ProviderError> {
        self.store
            .providers
            .find(provider_id)
            .await
            .map_err(|e| ProviderError::StorageError(e.to_string()))?
            .ok_or(ProviderError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<Provider>, ProviderError> {
        Ok(self.store.providers.list().await?)
    }
}
