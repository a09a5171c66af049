use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::clinical::{Appointment, AppointmentStatus};
use shared_store::repository::AppointmentFilter;
use shared_store::Datastore;

use crate::models::{AppointmentError, AppointmentSearchQuery, ScheduleAppointmentRequest};

pub struct AppointmentSchedulingService {
    store: Datastore,
}

impl AppointmentSchedulingService {
    pub fn new(store: Datastore) -> Self {
        Self { store }
    }

    /// Create a Scheduled appointment after verifying the patient and
    /// provider exist and the slot lies in the future.
    pub async fn schedule(
        &self,
        principal: &User,
        request: ScheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Scheduling {} visit for patient {} with provider {} (by {})",
            request.visit_type, request.patient_id, request.provider_id, principal.id
        );

        if request.scheduled_at <= Utc::now() {
            return Err(AppointmentError::InvalidTime(
                "Appointment must be scheduled for a future time".to_string(),
            ));
        }

        self.store
            .patients
            .find(request.patient_id)
            .await
            .map_err(|e| AppointmentError::StorageError(e.to_string()))?
            .ok_or(AppointmentError::PatientNotFound)?;

        self.store
            .providers
            .find(request.provider_id)
            .await
            .map_err(|e| AppointmentError::StorageError(e.to_string()))?
            .ok_or(AppointmentError::ProviderNotFound)?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            provider_id: request.provider_id,
            visit_type: request.visit_type,
            room: request.room,
            status: AppointmentStatus::Scheduled,
            scheduled_at: request.scheduled_at,
            checked_in_at: None,
            checked_out_at: None,
            invoice_id: None,
            follow_up_to: None,
            deleted: false,
            created_at: now,
            updated_at: now,
        };

        self.store.appointments.insert(&appointment).await?;

        Ok(appointment)
    }

    pub async fn get(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let appointment = self
            .store
            .appointments
            .find(appointment_id)
            .await
            .map_err(|e| AppointmentError::StorageError(e.to_string()))?
            .ok_or(AppointmentError::NotFound)?;

        if appointment.deleted {
            return Err(AppointmentError::NotFound);
        }

        Ok(appointment)
    }

    pub async fn search(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Searching appointments: {:?}", query);

        let filter = AppointmentFilter {
            patient_id: query.patient_id,
            provider_id: query.provider_id,
            status: query.status,
            visit_type: query.visit_type,
            scheduled_from: query.from_date,
            scheduled_to: query.to_date,
            patient_name: query.search,
            limit: query.limit,
            offset: query.offset,
            ..Default::default()
        };

        Ok(self.store.appointments.search(&filter).await?)
    }

    /// Soft delete: the record stays for linked queues/billing history.
    pub async fn delete(
        &self,
        principal: &User,
        appointment_id: Uuid,
    ) -> Result<(), AppointmentError> {
        // Confirm it exists and is visible before flagging.
        self.get(appointment_id).await?;

        self.store.appointments.soft_delete(appointment_id).await?;

        info!("Appointment {} deleted by {}", appointment_id, principal.id);
        Ok(())
    }
}
