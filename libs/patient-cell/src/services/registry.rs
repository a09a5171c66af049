use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::clinical::Patient;
use shared_store::Datastore;

use crate::models::{PatientError, RegisterPatientRequest};

pub struct PatientRegistryService {
    store: Datastore,
}

impl PatientRegistryService {
    pub fn new(store: Datastore) -> Self {
        Self { store }
    }

    pub async fn register(
        &self,
        principal: &User,
        request: RegisterPatientRequest,
    ) -> Result<Patient, PatientError> {
        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(PatientError::ValidationError(
                "Patient name must not be empty".to_string(),
            ));
        }

        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            date_of_birth: request.date_of_birth,
            created_at: Utc::now(),
        };

        self.store.patients.insert(&patient).await?;

        info!(
            "Patient {} registered by {}",
            patient.full_name(),
            principal.id
        );
        Ok(patient)
    }

    pub async fn get(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        self.store
            .patients
            .find(patient_id)
            .await
            .map_err(|e| PatientError::StorageError(e.to_string()))?
            .ok_or(PatientError::NotFound)
    }
}
