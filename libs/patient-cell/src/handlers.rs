use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_store::AppState;
use shared_utils::access::{ensure, Action};

use crate::models::{PatientError, RegisterPatientRequest};
use crate::services::registry::PatientRegistryService;

fn map_patient_error(err: PatientError) -> AppError {
    match err {
        PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
        PatientError::ValidationError(msg) => AppError::Validation(msg),
        PatientError::StorageError(msg) => AppError::Persistence(msg),
    }
}

#[axum::debug_handler]
pub async fn register_patient(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<RegisterPatientRequest>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::RegisterPatients)?;

    let service = PatientRegistryService::new(state.store.clone());
    let patient = service
        .register(&user, request)
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!({
        "success": true,
        "patient": patient,
        "message": "Patient registered"
    })))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ViewQueues)?;

    let service = PatientRegistryService::new(state.store.clone());
    let patient = service.get(patient_id).await.map_err(map_patient_error)?;

    Ok(Json(json!(patient)))
}
