pub mod memory;
pub mod repository;

use std::sync::Arc;

use shared_config::AppConfig;

use crate::memory::MemoryStore;
use crate::repository::{
    AppointmentRepository, PatientRepository, ProviderRepository, QueueRepository,
    SubscriptionRepository,
};

/// Handle bundle over the per-entity repositories. Cheap to clone; every
/// handle may point at the same backing store.
#[derive(Clone)]
pub struct Datastore {
    pub appointments: Arc<dyn AppointmentRepository>,
    pub queues: Arc<dyn QueueRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub providers: Arc<dyn ProviderRepository>,
    pub patients: Arc<dyn PatientRepository>,
}

impl Datastore {
    /// Reference in-memory store. Backs the test suites and the default
    /// deployment when no database URL is configured.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            appointments: store.clone(),
            queues: store.clone(),
            subscriptions: store.clone(),
            providers: store.clone(),
            patients: store,
        }
    }
}

/// Shared axum state: configuration plus the datastore handles.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Datastore,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Datastore) -> Self {
        Self { config, store }
    }
}
