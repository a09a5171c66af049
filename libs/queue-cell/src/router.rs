use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn queue_routes(state: AppState) -> Router {
    // All queue operations require authentication
    let protected_routes = Router::new()
        .route("/", get(handlers::list_queues))
        .route("/check-in", post(handlers::check_in_patient))
        .route("/move", post(handlers::move_patient_queue))
        .route("/{queue_id}/check-out", post(handlers::check_out_patient))
        .route("/{queue_id}/push", post(handlers::push_patient_queue))
        .route(
            "/{queue_id}/appointments/{appointment_id}",
            delete(handlers::delete_from_queue),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
