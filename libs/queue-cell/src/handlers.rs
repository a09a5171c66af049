use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use appointment_cell::models::AppointmentError;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_store::AppState;
use shared_utils::access::{ensure, Action};

use crate::models::{CheckInRequest, CheckOutRequest, MoveRequest, PushRequest, QueueError};
use crate::services::orchestrator::QueueOrchestrator;

fn map_queue_error(err: QueueError) -> AppError {
    match err {
        QueueError::QueueNotFound => AppError::NotFound("Queue not found".to_string()),
        QueueError::AppointmentNotFound => {
            AppError::NotFound("Appointment not found".to_string())
        }
        QueueError::ProviderNotFound => AppError::NotFound("Provider not found".to_string()),
        QueueError::NotQueued { .. } => AppError::NotFound(err.to_string()),
        QueueError::NotFound(msg) => AppError::NotFound(msg),
        QueueError::Lifecycle(inner) => match inner {
            AppointmentError::NotFound => {
                AppError::NotFound("Appointment not found".to_string())
            }
            AppointmentError::InvalidStatusTransition { .. } => {
                AppError::Validation(inner.to_string())
            }
            other => AppError::Validation(other.to_string()),
        },
        QueueError::ValidationError(msg) => AppError::Validation(msg),
        QueueError::StorageError(msg) => AppError::Persistence(msg),
    }
}

#[axum::debug_handler]
pub async fn check_in_patient(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ManageQueues)?;

    let orchestrator = QueueOrchestrator::new(state.store.clone());
    let appointment = orchestrator
        .check_in_patient(&user, request.appointment_id, request.destination)
        .await
        .map_err(map_queue_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Patient checked in"
    })))
}

#[axum::debug_handler]
pub async fn check_out_patient(
    State(state): State<AppState>,
    Path(queue_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<CheckOutRequest>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ManageQueues)?;

    let orchestrator = QueueOrchestrator::new(state.store.clone());
    let queue = orchestrator
        .check_out_patient(&user, queue_id, request.appointment_id)
        .await
        .map_err(map_queue_error)?;

    Ok(Json(json!({
        "success": true,
        "queue": queue,
        "message": "Patient checked out"
    })))
}

#[axum::debug_handler]
pub async fn push_patient_queue(
    State(state): State<AppState>,
    Path(queue_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<PushRequest>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ManageQueues)?;

    let orchestrator = QueueOrchestrator::new(state.store.clone());
    let queue = orchestrator
        .push_patient_queue(&user, queue_id, request.appointment_id, request.destination)
        .await
        .map_err(map_queue_error)?;

    Ok(Json(json!({
        "success": true,
        "queue": queue,
        "message": "Patient forwarded"
    })))
}

#[axum::debug_handler]
pub async fn move_patient_queue(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ManageQueues)?;

    let orchestrator = QueueOrchestrator::new(state.store.clone());
    let queue = orchestrator
        .move_patient_queue(
            &user,
            request.appointment_id,
            request.source_queue_id,
            request.destination_queue_id,
        )
        .await
        .map_err(map_queue_error)?;

    Ok(Json(json!({
        "success": true,
        "queue": queue,
        "message": "Patient moved"
    })))
}

#[axum::debug_handler]
pub async fn delete_from_queue(
    State(state): State<AppState>,
    Path((queue_id, appointment_id)): Path<(Uuid, Uuid)>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ManageQueues)?;

    let orchestrator = QueueOrchestrator::new(state.store.clone());
    let queue = orchestrator
        .delete_from_queue(&user, queue_id, appointment_id)
        .await
        .map_err(map_queue_error)?;

    Ok(Json(json!({
        "success": true,
        "queue": queue,
        "message": "Appointment removed from queue"
    })))
}

#[axum::debug_handler]
pub async fn list_queues(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ViewQueues)?;

    let orchestrator = QueueOrchestrator::new(state.store.clone());
    let queues = orchestrator
        .list_queues(&user)
        .await
        .map_err(map_queue_error)?;
    let count = queues.len();

    Ok(Json(json!({
        "queues": queues,
        "count": count
    })))
}
