use axum::{Router, routing::get};

use crate::{AppState, middleware::log_errors};

pub mod role;
pub mod user;

/// 所有接口挂在这个前缀下
pub const API_PREFIX: &str = "/api";

// 用户相关的路由
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(user::list_users).post(user::create_user))
        .route("/users/stats", get(user::user_stats))
        .route(
            "/users/{id}",
            get(user::get_user).put(user::update_user).delete(user::delete_user),
        )
}

// 角色相关的路由
pub fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/roles", get(role::list_roles).post(role::create_role))
        .route("/roles/stats", get(role::role_stats))
        .route(
            "/roles/{id}",
            get(role::get_role).put(role::update_role).delete(role::delete_role),
        )
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest(API_PREFIX, Router::new().merge(user_routes()).merge(role_routes()))
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
