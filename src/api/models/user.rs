use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 管理后台用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// 角色名称，对应 Role::name
    pub role: String,
    pub is_active: bool,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 用户列表查询条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// 按用户名、邮箱或姓名模糊搜索
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserFilters {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }
}

/// 创建用户请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// 更新用户请求，未提供的字段保持不变
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    pub fn role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Self::default()
        }
    }
}

/// 用户统计，由服务端计算
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_skip_unset_fields() {
        let filters = UserFilters {
            page: Some(2),
            is_active: Some(true),
            ..UserFilters::default()
        };
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json, serde_json::json!({ "page": 2, "isActive": true }));
    }

    #[test]
    fn user_reads_camel_case_payload() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "5",
            "username": "tran.minh",
            "email": "tran.minh@dseza.danang.gov.vn",
            "role": "viewer",
            "isActive": true,
            "fullName": "Trần Minh",
            "createdAt": "2024-03-01T08:00:00Z",
            "updatedAt": "2024-03-02T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(user.full_name, "Trần Minh");
        assert!(user.is_active);
    }
}
