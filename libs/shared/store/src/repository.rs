use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use shared_models::clinical::{
    Appointment, AppointmentStatus, NamedQueue, Patient, Provider, QueueKind,
    QueueSubscription, VisitType,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage failure: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub patient_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub visit_type: Option<VisitType>,
    pub scheduled_from: Option<DateTime<Utc>>,
    pub scheduled_to: Option<DateTime<Utc>>,
    pub checked_in_from: Option<DateTime<Utc>>,
    pub checked_in_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring match against the patient's full name;
    /// implementations join the patient registry.
    pub patient_name: Option<String>,
    pub include_deleted: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// Resolve a batch of ids. Missing ids are skipped; the returned order
    /// is storage order, not input order — callers that care re-sort.
    async fn fetch_many(&self, ids: &[Uuid]) -> Result<Vec<Appointment>, StoreError>;

    async fn insert(&self, appointment: &Appointment) -> Result<(), StoreError>;

    async fn update(&self, appointment: &Appointment) -> Result<(), StoreError>;

    /// Filtered search, sorted by scheduled time ascending.
    async fn search(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError>;

    async fn soft_delete(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Ordered-queue primitives. Each mutation is atomic with respect to the
/// queue's ordered list: the read-modify-write happens under one write
/// guard (in memory) or one transaction with a row lock (SQL).
#[async_trait]
pub trait QueueRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<NamedQueue>, StoreError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<NamedQueue>, StoreError>;

    /// The queue currently holding the appointment, if any.
    async fn find_containing(&self, appointment_id: Uuid)
        -> Result<Option<NamedQueue>, StoreError>;

    async fn list(&self) -> Result<Vec<NamedQueue>, StoreError>;

    /// Creates an empty queue; `Conflict` if the name is taken.
    async fn create(&self, name: &str, kind: QueueKind) -> Result<NamedQueue, StoreError>;

    /// Tail-append, creating the queue lazily if absent. Not idempotent:
    /// a duplicate push appends a duplicate entry.
    async fn push(
        &self,
        name: &str,
        kind: QueueKind,
        appointment_id: Uuid,
    ) -> Result<NamedQueue, StoreError>;

    /// Removes the first occurrence; `NotFound` if the queue or the entry
    /// is missing.
    async fn remove(&self, queue_id: Uuid, appointment_id: Uuid)
        -> Result<NamedQueue, StoreError>;

    /// Atomically removes from the source queue and tail-appends to the
    /// destination; never leaves the appointment in neither or both.
    /// Returns the updated destination queue.
    async fn transfer(
        &self,
        appointment_id: Uuid,
        source_id: Uuid,
        dest_id: Uuid,
    ) -> Result<NamedQueue, StoreError>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn find_for_user(&self, user_id: Uuid)
        -> Result<Option<QueueSubscription>, StoreError>;

    async fn upsert(&self, subscription: &QueueSubscription) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ProviderRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Provider>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Provider>, StoreError>;

    async fn insert(&self, provider: &Provider) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<Provider>, StoreError>;
}

#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Patient>, StoreError>;

    async fn insert(&self, patient: &Patient) -> Result<(), StoreError>;
}
