use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use crate::address::{Address, AddressPayload, FieldError};
use crate::server::AppState;
use crate::service::AddressService;
use crate::Error;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct DistanceParams {
    pub latitude: f64,
    pub longitude: f64,
    pub distance: f64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Failure of a request, mapped onto an HTTP status
#[derive(Debug)]
pub enum ApiError {
    /// Body, path or query could not be parsed
    Unprocessable(String),
    /// Parsed fine but violated field constraints
    Invalid(Vec<FieldError>),
    NotFound,
    /// Anything else; detail stays in the logs
    Internal,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(v) => ApiError::Invalid(v.fields),
            Error::NotFound(_) => ApiError::NotFound,
            other => {
                tracing::error!(error = %other, "Request failed");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, fields) = match self {
            ApiError::Unprocessable(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail, Vec::new()),
            ApiError::Invalid(fields) => (StatusCode::UNPROCESSABLE_ENTITY, "Validation failed".to_string(), fields),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Address not found".to_string(), Vec::new()),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), Vec::new()),
        };
        (status, Json(ErrorResponse { error, fields })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Run a blocking service call off the async runtime
async fn with_service<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&AddressService) -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Service task failed");
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}

fn path_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    path.map(|Path(id)| id).map_err(|e| ApiError::Unprocessable(e.body_text()))
}

fn body(payload: Result<Json<AddressPayload>, JsonRejection>) -> ApiResult<AddressPayload> {
    payload.map(|Json(p)| p).map_err(|e| ApiError::Unprocessable(e.body_text()))
}

pub async fn health(State(state): State<Arc<AppState>>) -> ApiResult<Json<serde_json::Value>> {
    let addresses = with_service(&state, |s| s.count_addresses()).await?;
    Ok(Json(serde_json::json!({"status": "ok", "addresses": addresses})))
}

pub async fn create_address(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AddressPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Address>)> {
    let payload = body(payload)?;
    let address = with_service(&state, move |s| s.add_address(payload)).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

pub async fn get_address(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Address>> {
    let id = path_id(path)?;
    let address = with_service(&state, move |s| s.get_address_by_id(id)).await?;
    Ok(Json(address))
}

pub async fn update_address(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AddressPayload>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = path_id(path)?;
    let payload = body(payload)?;
    with_service(&state, move |s| s.update_address(id, payload)).await?;
    Ok(Json(MessageResponse { message: "Address updated successfully" }))
}

pub async fn delete_address(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = path_id(path)?;
    with_service(&state, move |s| s.delete_address(id)).await?;
    Ok(Json(MessageResponse { message: "Address deleted successfully" }))
}

pub async fn list_addresses(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Address>>> {
    let addresses = with_service(&state, |s| s.get_all_addresses()).await?;
    Ok(Json(addresses))
}

pub async fn addresses_within_distance(
    State(state): State<Arc<AppState>>,
    params: Result<Query<DistanceParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Address>>> {
    let Query(params) = params.map_err(|e| ApiError::Unprocessable(e.body_text()))?;

    let addresses = with_service(&state, move |s| {
        s.get_addresses_within_distance(params.latitude, params.longitude, params.distance)
    })
    .await?;
    Ok(Json(addresses))
}
