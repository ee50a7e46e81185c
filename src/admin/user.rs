// 用户管理
// 读取走查询缓存，变更之后通过 DataSync 同步缓存

use crate::api::models::{
    CreateUserRequest, Paginated, UpdateUserRequest, User, UserFilters, UserStats,
};
use crate::api::operations::UserService;
use crate::cache::keys::{KeyPrefix, QueryKey, user_keys};
use crate::cache::models::QueryData;
use crate::cache::operations::{Fetcher, Subscription, fetcher};
use crate::error::ServiceError;
use crate::sync::DataSync;

use super::unexpected_data;

#[derive(Clone)]
pub struct UserAdmin {
    sync: DataSync,
    service: UserService,
}

impl UserAdmin {
    pub fn new(sync: DataSync, service: UserService) -> Self {
        Self { sync, service }
    }

    pub fn sync(&self) -> &DataSync {
        &self.sync
    }

    pub async fn list(&self, filters: UserFilters) -> Result<Paginated<User>, ServiceError> {
        let key = user_keys::list(filters.clone());
        let data = self.sync.store().fetch(key.clone(), self.list_fetcher(filters)).await?;
        data.as_user_page().cloned().ok_or_else(|| unexpected_data(&key))
    }

    /// 订阅列表，用户变更之后会自动重新拉取
    pub fn subscribe_list(&self, filters: UserFilters) -> Subscription {
        let key = user_keys::list(filters.clone());
        self.sync.store().subscribe(key, self.list_fetcher(filters))
    }

    pub async fn get(&self, user_id: &str) -> Result<User, ServiceError> {
        let key = user_keys::detail(user_id);
        let data = self.sync.store().fetch(key.clone(), self.detail_fetcher(user_id)).await?;
        data.as_user().cloned().ok_or_else(|| unexpected_data(&key))
    }

    pub async fn stats(&self) -> Result<UserStats, ServiceError> {
        let key = user_keys::stats();
        let service = self.service.clone();
        let stats_fetcher = fetcher(move || {
            let service = service.clone();
            async move { service.stats().await.map(QueryData::UserStats) }
        });
        let data = self.sync.store().fetch(key.clone(), stats_fetcher).await?;
        data.as_user_stats().cloned().ok_or_else(|| unexpected_data(&key))
    }

    pub async fn create(&self, req: &CreateUserRequest) -> Result<User, ServiceError> {
        let user = self.service.create(req).await?;
        self.sync.sync_after_user_mutation();
        self.write_detail(&user);
        Ok(user)
    }

    pub async fn update(
        &self,
        user_id: &str,
        req: &UpdateUserRequest,
    ) -> Result<User, ServiceError> {
        let user = self.service.update(user_id, req).await?;
        self.sync.sync_after_user_mutation();
        self.write_detail(&user);
        Ok(user)
    }

    pub async fn delete(&self, user_id: &str) -> Result<(), ServiceError> {
        self.service.delete(user_id).await?;
        self.sync
            .store()
            .remove(&KeyPrefix::from(user_keys::detail(user_id)));
        self.sync.sync_after_user_mutation();
        Ok(())
    }

    /// 修改用户角色。缓存先乐观更新，请求失败时回滚并返回 `StaleOptimistic`
    pub async fn change_role(&self, user_id: &str, role: &str) -> Result<User, ServiceError> {
        let change = self.sync.apply_optimistic_role_change(user_id, role);

        match self.service.update(user_id, &UpdateUserRequest::role(role)).await {
            Ok(user) => {
                change.commit();
                self.sync.sync_after_user_mutation();
                self.write_detail(&user);
                tracing::info!("User {} is now {}", user.username, user.role);
                Ok(user)
            }
            Err(err) => {
                tracing::error!("Role change for user {} failed: {}", user_id, err);
                change.rollback();
                Err(ServiceError::StaleOptimistic(Box::new(err)))
            }
        }
    }

    /// 用服务端返回的实体覆盖详情缓存
    fn write_detail(&self, user: &User) {
        let key: QueryKey = user_keys::detail(&user.id);
        self.sync
            .store()
            .set_data(&key, |_| Some(QueryData::User(user.clone())));
    }

    fn list_fetcher(&self, filters: UserFilters) -> Fetcher {
        let service = self.service.clone();
        fetcher(move || {
            let service = service.clone();
            let filters = filters.clone();
            async move { service.list(&filters).await.map(QueryData::UserPage) }
        })
    }

    fn detail_fetcher(&self, user_id: &str) -> Fetcher {
        let service = self.service.clone();
        let user_id = user_id.to_string();
        fetcher(move || {
            let service = service.clone();
            let user_id = user_id.clone();
            async move { service.get_by_id(&user_id).await.map(QueryData::User) }
        })
    }
}
