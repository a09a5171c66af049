use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_store::AppState;
use shared_utils::access::{ensure, Action};

use crate::models::{FeedQuery, SubscribeRequest, SubscriptionError};
use crate::services::aggregator::SubscriptionAggregator;

fn map_subscription_error(err: SubscriptionError) -> AppError {
    match err {
        SubscriptionError::QueueNotFound => AppError::NotFound("Queue not found".to_string()),
        SubscriptionError::NotFound(msg) => AppError::NotFound(msg),
        SubscriptionError::ValidationError(msg) => AppError::Validation(msg),
        SubscriptionError::StorageError(msg) => AppError::Persistence(msg),
    }
}

#[axum::debug_handler]
pub async fn subscribe_queue(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ManageSubscriptions)?;

    let aggregator = SubscriptionAggregator::new(state.store.clone());
    let subscription = aggregator
        .subscribe(&user, request.queue_id)
        .await
        .map_err(map_subscription_error)?;

    Ok(Json(json!({
        "success": true,
        "subscription": subscription,
        "message": "Subscribed to queue"
    })))
}

#[axum::debug_handler]
pub async fn unsubscribe_queue(
    State(state): State<AppState>,
    Path(queue_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ManageSubscriptions)?;

    let aggregator = SubscriptionAggregator::new(state.store.clone());
    let subscription = aggregator
        .unsubscribe(&user, queue_id)
        .await
        .map_err(map_subscription_error)?;

    Ok(Json(json!({
        "success": true,
        "subscription": subscription,
        "message": "Unsubscribed from queue"
    })))
}

#[axum::debug_handler]
pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ManageSubscriptions)?;

    let aggregator = SubscriptionAggregator::new(state.store.clone());
    let subscription = aggregator
        .current(&user)
        .await
        .map_err(map_subscription_error)?;

    Ok(Json(json!(subscription)))
}

#[axum::debug_handler]
pub async fn get_user_appointments(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ViewQueues)?;

    let aggregator = SubscriptionAggregator::new(state.store.clone());
    let page = aggregator
        .get_user_appointments(&user, query)
        .await
        .map_err(map_subscription_error)?;

    Ok(Json(json!(page)))
}
