//! HTTP handlers for `/api/v1/users`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::http::response::{ApiError, ApiResponse};
use crate::http::server::AppState;
use crate::user::dto::{
    UserCreateRequest, UserListRequest, UserListResponse, UserResponse, UserUpdateRequest,
};

type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

fn user_id(path: Result<Path<u64>, PathRejection>) -> Result<u64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|e| ApiError::validation(format!("invalid user id: {}", e.body_text())))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserCreateRequest>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<UserResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let user = state.users.create(request).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<UserListRequest>, QueryRejection>,
) -> ApiResult<UserListResponse> {
    let Query(request) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    Ok(ApiResponse::success(state.users.list(request).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<UserResponse> {
    let id = user_id(path)?;
    Ok(ApiResponse::success(state.users.get(id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<UserUpdateRequest>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let id = user_id(path)?;
    let Json(request) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    Ok(ApiResponse::success(state.users.update(id, request).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<()> {
    let id = user_id(path)?;
    state.users.delete(id).await?;
    Ok(ApiResponse::success(()))
}
