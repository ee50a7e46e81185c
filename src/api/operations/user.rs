// 用户服务
// 封装用户相关的 REST 调用

use super::client::{ApiClient, into_data, into_page};
use crate::api::models::{
    CreateUserRequest, Paginated, UpdateUserRequest, User, UserFilters, UserStats,
};
use crate::error::ServiceError;

#[derive(Debug, Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// 分页查询用户
    pub async fn list(&self, filters: &UserFilters) -> Result<Paginated<User>, ServiceError> {
        into_page(self.client.get_with_query("users", filters).await?)
    }

    pub async fn get_by_id(&self, user_id: &str) -> Result<User, ServiceError> {
        into_data(self.client.get(&format!("users/{user_id}")).await?)
    }

    pub async fn create(&self, req: &CreateUserRequest) -> Result<User, ServiceError> {
        tracing::debug!("Creating user {}", req.username);
        into_data(self.client.post("users", req).await?)
    }

    pub async fn update(
        &self,
        user_id: &str,
        req: &UpdateUserRequest,
    ) -> Result<User, ServiceError> {
        tracing::debug!("Updating user {}", user_id);
        into_data(self.client.put(&format!("users/{user_id}"), req).await?)
    }

    pub async fn delete(&self, user_id: &str) -> Result<(), ServiceError> {
        tracing::debug!("Deleting user {}", user_id);
        self.client
            .delete::<serde_json::Value>(&format!("users/{user_id}"))
            .await?;
        Ok(())
    }

    /// 用户总数和启用状态统计
    pub async fn stats(&self) -> Result<UserStats, ServiceError> {
        into_data(self.client.get("users/stats").await?)
    }
}
