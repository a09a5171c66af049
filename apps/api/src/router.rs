use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use patient_cell::router::patient_routes;
use provider_cell::router::provider_routes;
use queue_cell::router::queue_routes;
use shared_store::AppState;
use subscription_cell::router::subscription_routes;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "EMR patient-flow API is running!" }))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/queues", queue_routes(state.clone()))
        .nest("/subscriptions", subscription_routes(state.clone()))
        .nest("/providers", provider_routes(state.clone()))
        .nest("/patients", patient_routes(state))
}
