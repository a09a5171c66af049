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

use crate::models::{CreateProviderRequest, ProviderError};
use crate::services::directory::ProviderDirectoryService;

fn map_provider_error(err: ProviderError) -> AppError {
    match err {
        ProviderError::NotFound => AppError::NotFound("Provider not found".to_string()),
        ProviderError::ValidationError(msg) => AppError::Validation(msg),
        ProviderError::ProvisioningError(msg) => AppError::Internal(msg),
        ProviderError::StorageError(msg) => AppError::Persistence(msg),
    }
}

#[axum::debug_handler]
pub async fn create_provider(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateProviderRequest>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ManageStaff)?;

    let service = ProviderDirectoryService::new(state.store.clone());
    let provider = service
        .create_provider(&user, request)
        .await
        .map_err(map_provider_error)?;

    Ok(Json(json!({
        "success": true,
        "provider": provider,
        "message": "Provider created"
    })))
}

#[axum::debug_handler]
pub async fn get_provider(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ViewQueues)?;

    let service = ProviderDirectoryService::new(state.store.clone());
    let provider = service.get(provider_id).await.map_err(map_provider_error)?;

    Ok(Json(json!(provider)))
}

#[axum::debug_handler]
pub async fn list_providers(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure(&user, Action::ViewQueues)?;

    let service = ProviderDirectoryService::new(state.store.clone());
    let providers = service.list().await.map_err(map_provider_error)?;
    let count = providers.len();

    Ok(Json(json!({
        "providers": providers,
        "count": count
    })))
}
