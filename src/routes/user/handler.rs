use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{ApiResponse, CreateUserRequest, UpdateUserRequest, User, UserFilters, UserStats},
    error::AppError,
    utils::{message_to_api_response, paginated_to_api_response, success_to_api_response},
};

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Query(filters): Query<UserFilters>,
) -> Json<ApiResponse<Vec<User>>> {
    let page = state.db.read().await.list_users(&filters);
    paginated_to_api_response(page)
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = state.db.read().await.find_user(&user_id)?;
    Ok(success_to_api_response(user))
}

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), AppError> {
    let user = state.db.write().await.create_user(req)?;
    tracing::info!("User {} created with role {}", user.username, user.role);
    Ok((StatusCode::CREATED, success_to_api_response(user)))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = state.db.write().await.update_user(&user_id, req)?;
    Ok(success_to_api_response(user))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.db.write().await.delete_user(&user_id)?;
    Ok(message_to_api_response(format!("user {user_id} deleted")))
}

#[axum::debug_handler]
pub async fn user_stats(State(state): State<AppState>) -> Json<ApiResponse<UserStats>> {
    success_to_api_response(state.db.read().await.user_stats())
}
