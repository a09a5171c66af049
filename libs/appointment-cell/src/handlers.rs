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

use crate::models::{AppointmentError, AppointmentSearchQuery, ScheduleAppointmentRequest};
use crate::services::scheduling::AppointmentSchedulingService;

fn map_appointment_error(err: AppointmentError) -> AppError {
    match err {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
        AppointmentError::ProviderNotFound => {
            AppError::NotFound("Provider not found".to_string())
        }
        AppointmentError::InvalidStatusTransition { .. } => {
            AppError::Validation(err.to_string())
        }
        AppointmentError::InvalidTime(msg) => AppError::Validation(msg),
        AppointmentError::ValidationError(msg) => AppError::Validation(msg),
        AppointmentError::StorageError(msg) => AppError::Persistence(msg),
    }
}

#[axum::debug_handler]
pub async fn schedule_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<ScheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ScheduleAppointments)?;

    let service = AppointmentSchedulingService::new(state.store.clone());
    let appointment = service
        .schedule(&user, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment scheduled successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ViewQueues)?;

    let service = AppointmentSchedulingService::new(state.store.clone());
    let appointment = service
        .get(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(state): State<AppState>,
    Query(query): Query<AppointmentSearchQuery>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ViewQueues)?;

    let service = AppointmentSchedulingService::new(state.store.clone());
    let appointments = service.search(query).await.map_err(map_appointment_error)?;
    let count = appointments.len();

    Ok(Json(json!({
        "appointments": appointments,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ManageQueues)?;

    let service = AppointmentSchedulingService::new(state.store.clone());
    service
        .delete(&user, appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment deleted"
    })))
}
