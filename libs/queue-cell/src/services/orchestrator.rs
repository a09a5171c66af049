use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use appointment_cell::services::lifecycle::AppointmentLifecycleService;
use shared_models::auth::User;
use shared_models::clinical::{
    Appointment, NamedQueue, Provider, QueueKind, StaffRole,
};
use shared_store::Datastore;

use crate::models::{Destination, QueueError, QueueView};

pub const PRE_EXAM_QUEUE: &str = "Pre-Exam";
pub const PRE_OPERATION_QUEUE: &str = "Pre-Operation";

/// Coordinates the appointment state machine and the queue store: resolves
/// symbolic destinations to concrete queues and performs membership
/// changes. Every operation takes the authenticated principal explicitly.
pub struct QueueOrchestrator {
    store: Datastore,
    lifecycle: AppointmentLifecycleService,
}

impl QueueOrchestrator {
    pub fn new(store: Datastore) -> Self {
        Self {
            store,
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    /// Map a destination tag to a concrete queue name and kind. PHYSICIAN
    /// resolves through the appointment's assigned provider.
    pub async fn resolve_destination(
        &self,
        destination: Destination,
        appointment: &Appointment,
    ) -> Result<(String, QueueKind), QueueError> {
        match destination {
            Destination::PreExam => Ok((PRE_EXAM_QUEUE.to_string(), QueueKind::PreExam)),
            Destination::PreOperation => {
                Ok((PRE_OPERATION_QUEUE.to_string(), QueueKind::PreOperation))
            }
            Destination::Physician => {
                let provider = self
                    .store
                    .providers
                    .find(appointment.provider_id)
                    .await
                    .map_err(|e| QueueError::StorageError(e.to_string()))?
                    .ok_or(QueueError::ProviderNotFound)?;
                Ok((provider.queue_name(), QueueKind::User))
            }
        }
    }

    /// Check a patient in: stamp the appointment, spawn the post-operative
    /// follow-up for surgery visits, then enqueue at the resolved
    /// destination. Steps are sequential writes; a partial failure is
    /// surfaced to the caller uncompensated.
    pub async fn check_in_patient(
        &self,
        principal: &User,
        appointment_id: Uuid,
        destination: Destination,
    ) -> Result<Appointment, QueueError> {
        info!(
            "Check-in of appointment {} toward {} (by {})",
            appointment_id, destination, principal.id
        );

        let mut appointment = self.load_appointment(appointment_id).await?;

        let now = Utc::now();
        self.lifecycle.apply_check_in(&mut appointment, now)?;
        self.store
            .appointments
            .update(&appointment)
            .await
            .map_err(|e| QueueError::StorageError(e.to_string()))?;

        if appointment.visit_type.spawns_post_op() {
            let post_op = self.lifecycle.spawn_post_op(&appointment, now);
            self.store
                .appointments
                .insert(&post_op)
                .await
                .map_err(|e| QueueError::StorageError(e.to_string()))?;
            info!(
                "Post-operative follow-up {} spawned for surgery visit {}",
                post_op.id, appointment.id
            );
        }

        let (queue_name, kind) = self.resolve_destination(destination, &appointment).await?;
        self.store
            .queues
            .push(&queue_name, kind, appointment.id)
            .await?;

        Ok(appointment)
    }

    /// Check a patient out of the queue currently serving them: stamp the
    /// appointment Checked-Out and drop it from the queue.
    pub async fn check_out_patient(
        &self,
        principal: &User,
        queue_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<NamedQueue, QueueError> {
        info!(
            "Check-out of appointment {} from queue {} (by {})",
            appointment_id, queue_id, principal.id
        );

        let queue = self
            .store
            .queues
            .find(queue_id)
            .await?
            .ok_or(QueueError::QueueNotFound)?;

        if !queue.contains(appointment_id) {
            return Err(QueueError::NotQueued {
                queue_id,
                appointment_id,
            });
        }

        let mut appointment = self.load_appointment(appointment_id).await?;

        let now = Utc::now();
        self.lifecycle.apply_check_out(&mut appointment, now)?;
        self.store
            .appointments
            .update(&appointment)
            .await
            .map_err(|e| QueueError::StorageError(e.to_string()))?;

        Ok(self.store.queues.remove(queue_id, appointment_id).await?)
    }

    /// Forward a queued patient to a symbolic destination: resolves the
    /// tag, lazily creates the target queue, then transfers atomically so
    /// the appointment never sits in two queues.
    pub async fn push_patient_queue(
        &self,
        principal: &User,
        source_queue_id: Uuid,
        appointment_id: Uuid,
        destination: Destination,
    ) -> Result<NamedQueue, QueueError> {
        debug!(
            "Push of appointment {} from queue {} toward {} (by {})",
            appointment_id, source_queue_id, destination, principal.id
        );

        let source = self
            .store
            .queues
            .find(source_queue_id)
            .await?
            .ok_or(QueueError::QueueNotFound)?;

        if !source.contains(appointment_id) {
            return Err(QueueError::NotQueued {
                queue_id: source_queue_id,
                appointment_id,
            });
        }

        let appointment = self.load_appointment(appointment_id).await?;
        let (queue_name, kind) = self.resolve_destination(destination, &appointment).await?;

        let dest = match self.store.queues.find_by_name(&queue_name).await? {
            Some(queue) => queue,
            None => self.store.queues.create(&queue_name, kind).await?,
        };

        Ok(self
            .store
            .queues
            .transfer(appointment_id, source.id, dest.id)
            .await?)
    }

    /// Move between two explicit queues. The transfer primitive keeps the
    /// operation atomic: on success the appointment sits exactly once in
    /// the destination, on failure both queues are untouched.
    pub async fn move_patient_queue(
        &self,
        principal: &User,
        appointment_id: Uuid,
        source_queue_id: Uuid,
        destination_queue_id: Uuid,
    ) -> Result<NamedQueue, QueueError> {
        debug!(
            "Move of appointment {} from queue {} to queue {} (by {})",
            appointment_id, source_queue_id, destination_queue_id, principal.id
        );

        Ok(self
            .store
            .queues
            .transfer(appointment_id, source_queue_id, destination_queue_id)
            .await?)
    }

    /// Drop an appointment from a queue without touching its status. The
    /// queue entry is a weak reference; the appointment record survives.
    pub async fn delete_from_queue(
        &self,
        principal: &User,
        queue_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<NamedQueue, QueueError> {
        debug!(
            "Removal of appointment {} from queue {} (by {})",
            appointment_id, queue_id, principal.id
        );

        Ok(self.store.queues.remove(queue_id, appointment_id).await?)
    }

    /// All queues, hydrated for display. Physicians see every shared queue
    /// but only their own personal queue.
    pub async fn list_queues(&self, principal: &User) -> Result<Vec<QueueView>, QueueError> {
        let queues = self.store.queues.list().await?;

        let queues = if principal.has_role(StaffRole::Physician) {
            let own_queue_name = self
                .store
                .providers
                .find(principal.id)
                .await
                .map_err(|e| QueueError::StorageError(e.to_string()))?
                .map(|p| p.queue_name());

            queues
                .into_iter()
                .filter(|q| {
                    q.kind != QueueKind::User || Some(&q.name) == own_queue_name.as_ref()
                })
                .collect()
        } else {
            queues
        };

        let mut views = Vec::with_capacity(queues.len());
        for queue in queues {
            views.push(self.hydrate(queue).await?);
        }
        Ok(views)
    }

    /// Create the physician's personal USER-kind queue if it does not
    /// exist yet. Called from account creation.
    pub async fn provision_physician_queue(
        &self,
        provider: &Provider,
    ) -> Result<NamedQueue, QueueError> {
        let name = provider.queue_name();
        match self.store.queues.find_by_name(&name).await? {
            Some(queue) => Ok(queue),
            None => {
                info!("Provisioning personal queue '{}'", name);
                Ok(self.store.queues.create(&name, QueueKind::User).await?)
            }
        }
    }

    /// Resolve the ordered id list against the appointment store. The
    /// fetch returns storage order; the re-sort below restores the
    /// queue's own order.
    async fn hydrate(&self, queue: NamedQueue) -> Result<QueueView, QueueError> {
        let fetched = self
            .store
            .appointments
            .fetch_many(&queue.appointment_ids)
            .await
            .map_err(|e| QueueError::StorageError(e.to_string()))?;

        let mut appointments = Vec::with_capacity(queue.appointment_ids.len());
        for id in &queue.appointment_ids {
            if let Some(appointment) = fetched.iter().find(|a| a.id == *id) {
                appointments.push(appointment.clone());
            }
        }

        Ok(QueueView {
            id: queue.id,
            name: queue.name,
            kind: queue.kind,
            appointments,
        })
    }

    async fn load_appointment(&self, appointment_id: Uuid) -> Result<Appointment, QueueError> {
        let appointment = self
            .store
            .appointments
            .find(appointment_id)
            .await
            .map_err(|e| QueueError::StorageError(e.to_string()))?
            .ok_or(QueueError::AppointmentNotFound)?;

        if appointment.deleted {
            return Err(QueueError::AppointmentNotFound);
        }

        Ok(appointment)
    }
}
