use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::CreateMappingRequest;
use crate::services::MappingService;

#[axum::debug_handler]
pub async fn create_mapping(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateMappingRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = MappingService::new(&config);

    let mapping = service
        .create_mapping(request, &user.id, auth.token())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": { "mapping": mapping }
        })),
    ))
}

#[axum::debug_handler]
pub async fn list_mappings(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = MappingService::new(&config);

    let mappings = service.list_mappings(&user.id, auth.token()).await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "mappings": mappings }
    })))
}

#[axum::debug_handler]
pub async fn list_mappings_for_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = MappingService::new(&config);

    let mappings = service
        .list_mappings_for_patient(patient_id, &user.id, auth.token())
        .await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "mappings": mappings }
    })))
}

#[axum::debug_handler]
pub async fn delete_mapping(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(mapping_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = MappingService::new(&config);

    service
        .deactivate_mapping(mapping_id, &user.id, auth.token())
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Mapping deleted successfully"
    })))
}
