use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn subscription_routes(state: AppState) -> Router {
    // All subscription operations require authentication
    let protected_routes = Router::new()
        .route("/", post(handlers::subscribe_queue))
        .route("/", get(handlers::get_subscription))
        .route("/{queue_id}", delete(handlers::unsubscribe_queue))
        .route("/appointments", get(handlers::get_user_appointments))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
