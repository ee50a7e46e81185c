// 角色管理

use crate::api::models::{
    CreateRoleRequest, Paginated, Role, RoleFilters, RoleStats, UpdateRoleRequest,
};
use crate::api::operations::RoleService;
use crate::cache::keys::{KeyPrefix, role_keys};
use crate::cache::models::QueryData;
use crate::cache::operations::{Fetcher, Subscription, fetcher};
use crate::error::ServiceError;
use crate::sync::DataSync;

use super::unexpected_data;

#[derive(Clone)]
pub struct RoleAdmin {
    sync: DataSync,
    service: RoleService,
}

impl RoleAdmin {
    pub fn new(sync: DataSync, service: RoleService) -> Self {
        Self { sync, service }
    }

    pub async fn list(&self, filters: RoleFilters) -> Result<Paginated<Role>, ServiceError> {
        let key = role_keys::list(filters.clone());
        let data = self.sync.store().fetch(key.clone(), self.list_fetcher(filters)).await?;
        data.as_role_page().cloned().ok_or_else(|| unexpected_data(&key))
    }

    pub fn subscribe_list(&self, filters: RoleFilters) -> Subscription {
        let key = role_keys::list(filters.clone());
        self.sync.store().subscribe(key, self.list_fetcher(filters))
    }

    pub async fn get(&self, role_id: &str) -> Result<Role, ServiceError> {
        let key = role_keys::detail(role_id);
        let service = self.service.clone();
        let id = role_id.to_string();
        let detail_fetcher = fetcher(move || {
            let service = service.clone();
            let id = id.clone();
            async move { service.get_by_id(&id).await.map(QueryData::Role) }
        });
        let data = self.sync.store().fetch(key.clone(), detail_fetcher).await?;
        data.as_role().cloned().ok_or_else(|| unexpected_data(&key))
    }

    /// 每个角色的用户数量。用户改角色之后会被标记为过期
    pub async fn stats(&self) -> Result<RoleStats, ServiceError> {
        let key = role_keys::stats();
        let data = self.sync.store().fetch(key.clone(), self.stats_fetcher()).await?;
        data.as_role_stats().cloned().ok_or_else(|| unexpected_data(&key))
    }

    /// 订阅角色统计，失效之后自动刷新
    pub fn subscribe_stats(&self) -> Subscription {
        self.sync.store().subscribe(role_keys::stats(), self.stats_fetcher())
    }

    pub async fn create(&self, req: &CreateRoleRequest) -> Result<Role, ServiceError> {
        let role = self.service.create(req).await?;
        self.sync.sync_after_role_mutation();
        Ok(role)
    }

    pub async fn update(
        &self,
        role_id: &str,
        req: &UpdateRoleRequest,
    ) -> Result<Role, ServiceError> {
        let role = self.service.update(role_id, req).await?;
        self.sync.sync_after_role_mutation();
        self.sync
            .store()
            .set_data(&role_keys::detail(role_id), |_| Some(QueryData::Role(role.clone())));
        Ok(role)
    }

    pub async fn delete(&self, role_id: &str) -> Result<(), ServiceError> {
        self.service.delete(role_id).await?;
        self.sync
            .store()
            .remove(&KeyPrefix::from(role_keys::detail(role_id)));
        self.sync.sync_after_role_mutation();
        Ok(())
    }

    fn list_fetcher(&self, filters: RoleFilters) -> Fetcher {
        let service = self.service.clone();
        fetcher(move || {
            let service = service.clone();
            let filters = filters.clone();
            async move { service.list(&filters).await.map(QueryData::RolePage) }
        })
    }

    fn stats_fetcher(&self) -> Fetcher {
        let service = self.service.clone();
        fetcher(move || {
            let service = service.clone();
            async move { service.stats().await.map(QueryData::RoleStats) }
        })
    }
}
