// 角色服务
// 封装角色相关的 REST 调用

use super::client::{ApiClient, into_data, into_page};
use crate::api::models::{
    CreateRoleRequest, Paginated, Role, RoleFilters, RoleStats, UpdateRoleRequest,
};
use crate::error::ServiceError;

#[derive(Debug, Clone)]
pub struct RoleService {
    client: ApiClient,
}

impl RoleService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filters: &RoleFilters) -> Result<Paginated<Role>, ServiceError> {
        into_page(self.client.get_with_query("roles", filters).await?)
    }

    pub async fn get_by_id(&self, role_id: &str) -> Result<Role, ServiceError> {
        into_data(self.client.get(&format!("roles/{role_id}")).await?)
    }

    pub async fn create(&self, req: &CreateRoleRequest) -> Result<Role, ServiceError> {
        tracing::debug!("Creating role {}", req.name);
        into_data(self.client.post("roles", req).await?)
    }

    pub async fn update(
        &self,
        role_id: &str,
        req: &UpdateRoleRequest,
    ) -> Result<Role, ServiceError> {
        tracing::debug!("Updating role {}", role_id);
        into_data(self.client.put(&format!("roles/{role_id}"), req).await?)
    }

    pub async fn delete(&self, role_id: &str) -> Result<(), ServiceError> {
        tracing::debug!("Deleting role {}", role_id);
        self.client
            .delete::<serde_json::Value>(&format!("roles/{role_id}"))
            .await?;
        Ok(())
    }

    /// 每个角色的用户数量，由服务端统计
    pub async fn stats(&self) -> Result<RoleStats, ServiceError> {
        into_data(self.client.get("roles/stats").await?)
    }
}
