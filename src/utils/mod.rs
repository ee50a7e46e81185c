use axum::Json;
use serde::Serialize;

use crate::api::models::common::{ApiResponse, Paginated};

pub mod format;
pub mod i18n;

pub use format::{format_file_size, slugify};
pub use i18n::{Language, role_label};

// 所有 handler 返回 Json<ApiResponse<T>>
pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

pub fn paginated_to_api_response<T: Serialize>(page: Paginated<T>) -> Json<ApiResponse<Vec<T>>> {
    Json(ApiResponse {
        success: true,
        message: None,
        data: Some(page.data),
        pagination: Some(page.pagination),
    })
}

/// 没有数据、只带提示信息的成功响应
pub fn message_to_api_response(message: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        success: true,
        message: Some(message.into()),
        data: None,
        pagination: None,
    })
}
