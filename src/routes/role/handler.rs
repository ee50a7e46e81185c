use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{ApiResponse, CreateRoleRequest, Role, RoleFilters, RoleStats, UpdateRoleRequest},
    error::AppError,
    utils::{message_to_api_response, paginated_to_api_response, success_to_api_response},
};

#[axum::debug_handler]
pub async fn list_roles(
    State(state): State<AppState>,
    Query(filters): Query<RoleFilters>,
) -> Json<ApiResponse<Vec<Role>>> {
    let page = state.db.read().await.list_roles(&filters);
    paginated_to_api_response(page)
}

#[axum::debug_handler]
pub async fn get_role(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> Result<Json<ApiResponse<Role>>, AppError> {
    let role = state.db.read().await.find_role(&role_id)?;
    Ok(success_to_api_response(role))
}

#[axum::debug_handler]
pub async fn create_role(
    State(state): State<AppState>,
    Json(req): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Role>>), AppError> {
    let role = state.db.write().await.create_role(req)?;
    tracing::info!("Role {} created", role.name);
    Ok((StatusCode::CREATED, success_to_api_response(role)))
}

#[axum::debug_handler]
pub async fn update_role(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<Role>>, AppError> {
    let role = state.db.write().await.update_role(&role_id, req)?;
    Ok(success_to_api_response(role))
}

#[axum::debug_handler]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.db.write().await.delete_role(&role_id)?;
    Ok(message_to_api_response(format!("role {role_id} deleted")))
}

// 统计每个角色下的用户数
#[axum::debug_handler]
pub async fn role_stats(State(state): State<AppState>) -> Json<ApiResponse<RoleStats>> {
    success_to_api_response(state.db.read().await.role_stats())
}
