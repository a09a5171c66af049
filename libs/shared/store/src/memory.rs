use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::clinical::{
    Appointment, NamedQueue, Patient, Provider, QueueKind, QueueSubscription,
};

use crate::repository::{
    AppointmentFilter, AppointmentRepository, PatientRepository, ProviderRepository,
    QueueRepository, StoreError, SubscriptionRepository,
};

/// Reference store. Each table sits behind its own `RwLock`; queue
/// mutations take the queue table's write guard for the whole
/// read-modify-write, which serializes concurrent pushes/moves against the
/// same ordered list.
pub struct MemoryStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
    queues: RwLock<HashMap<Uuid, NamedQueue>>,
    subscriptions: RwLock<HashMap<Uuid, QueueSubscription>>,
    providers: RwLock<HashMap<Uuid, Provider>>,
    patients: RwLock<HashMap<Uuid, Patient>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            appointments: RwLock::new(HashMap::new()),
            queues: RwLock::new(HashMap::new()),
            subscriptions: RwLock::new(HashMap::new()),
            providers: RwLock::new(HashMap::new()),
            patients: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppointmentRepository for MemoryStore {
    async fn find(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let table = self.appointments.read().await;
        Ok(table.get(&id).cloned())
    }

    async fn fetch_many(&self, ids: &[Uuid]) -> Result<Vec<Appointment>, StoreError> {
        let table = self.appointments.read().await;
        // Iteration order of the table, not input order.
        Ok(table
            .values()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn insert(&self, appointment: &Appointment) -> Result<(), StoreError> {
        let mut table = self.appointments.write().await;
        if table.contains_key(&appointment.id) {
            return Err(StoreError::Conflict(format!(
                "appointment {} already exists",
                appointment.id
            )));
        }
        table.insert(appointment.id, appointment.clone());
        Ok(())
    }

    async fn update(&self, appointment: &Appointment) -> Result<(), StoreError> {
        let mut table = self.appointments.write().await;
        if !table.contains_key(&appointment.id) {
            return Err(StoreError::NotFound(format!(
                "appointment {}",
                appointment.id
            )));
        }
        table.insert(appointment.id, appointment.clone());
        Ok(())
    }

    async fn search(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError> {
        let name_term = filter.patient_name.as_ref().map(|t| t.to_lowercase());

        // Resolve the name term against the patient registry first to keep
        // the appointment pass single-table.
        let matching_patients: Option<Vec<Uuid>> = match &name_term {
            Some(term) => {
                let patients = self.patients.read().await;
                Some(
                    patients
                        .values()
                        .filter(|p| p.full_name().to_lowercase().contains(term))
                        .map(|p| p.id)
                        .collect(),
                )
            }
            None => None,
        };

        let table = self.appointments.read().await;
        let mut hits: Vec<Appointment> = table
            .values()
            .filter(|a| filter.include_deleted || !a.deleted)
            .filter(|a| filter.patient_id.map_or(true, |id| a.patient_id == id))
            .filter(|a| filter.provider_id.map_or(true, |id| a.provider_id == id))
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .filter(|a| filter.visit_type.map_or(true, |v| a.visit_type == v))
            .filter(|a| filter.scheduled_from.map_or(true, |t| a.scheduled_at >= t))
            .filter(|a| filter.scheduled_to.map_or(true, |t| a.scheduled_at < t))
            .filter(|a| {
                filter
                    .checked_in_from
                    .map_or(true, |t| a.checked_in_at.map_or(false, |c| c >= t))
            })
            .filter(|a| {
                filter
                    .checked_in_to
                    .map_or(true, |t| a.checked_in_at.map_or(false, |c| c < t))
            })
            .filter(|a| {
                matching_patients
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&a.patient_id))
            })
            .cloned()
            .collect();

        hits.sort_by_key(|a| a.scheduled_at);

        let offset = filter.offset.unwrap_or(0);
        let hits: Vec<Appointment> = match filter.limit {
            Some(limit) => hits.into_iter().skip(offset).take(limit).collect(),
            None => hits.into_iter().skip(offset).collect(),
        };

        Ok(hits)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut table = self.appointments.write().await;
        match table.get_mut(&id) {
            Some(appointment) => {
                appointment.deleted = true;
                appointment.updated_at = Utc::now();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("appointment {}", id))),
        }
    }
}

#[async_trait]
impl QueueRepository for MemoryStore {
    async fn find(&self, id: Uuid) -> Result<Option<NamedQueue>, StoreError> {
        let table = self.queues.read().await;
        Ok(table.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<NamedQueue>, StoreError> {
        let table = self.queues.read().await;
        Ok(table.values().find(|q| q.name == name).cloned())
    }

    async fn find_containing(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<NamedQueue>, StoreError> {
        let table = self.queues.read().await;
        Ok(table
            .values()
            .find(|q| q.contains(appointment_id))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<NamedQueue>, StoreError> {
        let table = self.queues.read().await;
        let mut queues: Vec<NamedQueue> = table.values().cloned().collect();
        queues.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(queues)
    }

    async fn create(&self, name: &str, kind: QueueKind) -> Result<NamedQueue, StoreError> {
        let mut table = self.queues.write().await;
        if table.values().any(|q| q.name == name) {
            return Err(StoreError::Conflict(format!("queue '{}' already exists", name)));
        }
        let now = Utc::now();
        let queue = NamedQueue {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind,
            appointment_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        table.insert(queue.id, queue.clone());
        debug!("Queue '{}' created ({:?})", name, kind);
        Ok(queue)
    }

    async fn push(
        &self,
        name: &str,
        kind: QueueKind,
        appointment_id: Uuid,
    ) -> Result<NamedQueue, StoreError> {
        let mut table = self.queues.write().await;
        let now = Utc::now();

        let existing_id = table.values().find(|q| q.name == name).map(|q| q.id);
        let queue = match existing_id {
            Some(id) => table.get_mut(&id).expect("queue indexed by id"),
            None => {
                let queue = NamedQueue {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    kind,
                    appointment_ids: Vec::new(),
                    created_at: now,
                    updated_at: now,
                };
                debug!("Queue '{}' lazily created ({:?})", name, kind);
                table.entry(queue.id).or_insert(queue)
            }
        };

        queue.appointment_ids.push(appointment_id);
        queue.updated_at = now;
        Ok(queue.clone())
    }

    async fn remove(
        &self,
        queue_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<NamedQueue, StoreError> {
        let mut table = self.queues.write().await;
        let queue = table
            .get_mut(&queue_id)
            .ok_or_else(|| StoreError::NotFound(format!("queue {}", queue_id)))?;

        let position = queue.position(appointment_id).ok_or_else(|| {
            StoreError::NotFound(format!(
                "appointment {} not in queue '{}'",
                appointment_id, queue.name
            ))
        })?;

        queue.appointment_ids.remove(position);
        queue.updated_at = Utc::now();
        Ok(queue.clone())
    }

    async fn transfer(
        &self,
        appointment_id: Uuid,
        source_id: Uuid,
        dest_id: Uuid,
    ) -> Result<NamedQueue, StoreError> {
        let mut table = self.queues.write().await;

        // Validate both sides before mutating anything.
        let source = table
            .get(&source_id)
            .ok_or_else(|| StoreError::NotFound(format!("queue {}", source_id)))?;
        let position = source.position(appointment_id).ok_or_else(|| {
            StoreError::NotFound(format!(
                "appointment {} not in queue '{}'",
                appointment_id, source.name
            ))
        })?;
        if !table.contains_key(&dest_id) {
            return Err(StoreError::NotFound(format!("queue {}", dest_id)));
        }

        let now = Utc::now();
        {
            let source = table.get_mut(&source_id).expect("validated above");
            source.appointment_ids.remove(position);
            source.updated_at = now;
        }
        let dest = table.get_mut(&dest_id).expect("validated above");
        dest.appointment_ids.push(appointment_id);
        dest.updated_at = now;
        Ok(dest.clone())
    }
}

#[async_trait]
impl SubscriptionRepository for MemoryStore {
    async fn find_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<QueueSubscription>, StoreError> {
        let table = self.subscriptions.read().await;
        Ok(table.get(&user_id).cloned())
    }

    async fn upsert(&self, subscription: &QueueSubscription) -> Result<(), StoreError> {
        let mut table = self.subscriptions.write().await;
        table.insert(subscription.user_id, subscription.clone());
        Ok(())
    }
}

#[async_trait]
impl ProviderRepository for MemoryStore {
    async fn find(&self, id: Uuid) -> Result<Option<Provider>, StoreError> {
        let table = self.providers.read().await;
        Ok(table.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Provider>, StoreError> {
        let table = self.providers.read().await;
        Ok(table.values().find(|p| p.email == email).cloned())
    }

    async fn insert(&self, provider: &Provider) -> Result<(), StoreError> {
        let mut table = self.providers.write().await;
        if table.contains_key(&provider.id) {
            return Err(StoreError::Conflict(format!(
                "provider {} already exists",
                provider.id
            )));
        }
        if table.values().any(|p| p.email == provider.email) {
            return Err(StoreError::Conflict(format!(
                "provider email '{}' already registered",
                provider.email
            )));
        }
        table.insert(provider.id, provider.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Provider>, StoreError> {
        let table = self.providers.read().await;
        let mut providers: Vec<Provider> = table.values().cloned().collect();
        providers.sort_by(|a, b| a.last_name.cmp(&b.last_name));
        Ok(providers)
    }
}

#[async_trait]
impl PatientRepository for MemoryStore {
    async fn find(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        let table = self.patients.read().await;
        Ok(table.get(&id).cloned())
    }

    async fn insert(&self, patient: &Patient) -> Result<(), StoreError> {
        let mut table = self.patients.write().await;
        if table.contains_key(&patient.id) {
            return Err(StoreError::Conflict(format!(
                "patient {} already exists",
                patient.id
            )));
        }
        table.insert(patient.id, patient.clone());
        Ok(())
    }
}
