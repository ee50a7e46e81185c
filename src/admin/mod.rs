// 管理后台的数据层入口
// 组合 REST 服务、查询缓存和同步协调器

pub mod role;
pub mod user;

pub use role::RoleAdmin;
pub use user::UserAdmin;

use crate::api::operations::{ApiClient, RoleService, UserService};
use crate::cache::keys::QueryKey;
use crate::cache::operations::QueryStore;
use crate::config::Config;
use crate::error::ServiceError;
use crate::sync::DataSync;

/// 一个管理后台会话使用的全部数据对象，共享同一个缓存
#[derive(Clone)]
pub struct AdminData {
    pub sync: DataSync,
    pub users: UserAdmin,
    pub roles: RoleAdmin,
}

impl AdminData {
    pub fn new(config: &Config) -> Self {
        Self::with_client(config, ApiClient::new(config.api_base_url.clone()))
    }

    pub fn with_client(config: &Config, client: ApiClient) -> Self {
        let store = QueryStore::create(config.store_config());
        let sync = DataSync::new(store, config.stats_refresh_delay());
        Self {
            users: UserAdmin::new(sync.clone(), UserService::new(client.clone())),
            roles: RoleAdmin::new(sync.clone(), RoleService::new(client)),
            sync,
        }
    }

    /// 手动刷新所有数据
    pub fn refresh_all(&self) -> usize {
        self.sync.force_refresh_all()
    }

    /// 取消延迟任务并释放缓存，之后的读取都返回 `Disposed`
    pub fn dispose(&self) {
        self.sync.dispose();
        self.sync.store().dispose();
    }
}

pub(crate) fn unexpected_data(key: &QueryKey) -> ServiceError {
    ServiceError::Decode(format!("unexpected cached data for {key}"))
}
