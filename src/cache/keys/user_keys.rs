use super::{KeyPrefix, QueryKey, ResourceKind, Scope};
use crate::api::models::UserFilters;

/// 全部用户，也是所有用户键的根
pub fn all() -> QueryKey {
    QueryKey::UsersAll
}

/// 生成用户列表缓存键
pub fn list(filters: UserFilters) -> QueryKey {
    QueryKey::UsersList(filters)
}

/// 生成用户详情缓存键
pub fn detail(user_id: impl Into<String>) -> QueryKey {
    QueryKey::UsersDetail(user_id.into())
}

/// 用户统计缓存键
pub fn stats() -> QueryKey {
    QueryKey::UsersStats
}

/// 所有用户相关的键
pub fn prefix() -> KeyPrefix {
    KeyPrefix::resource(ResourceKind::Users)
}

/// 所有用户列表，不论查询条件
pub fn lists() -> KeyPrefix {
    KeyPrefix::scope(ResourceKind::Users, Scope::List)
}

pub fn details() -> KeyPrefix {
    KeyPrefix::scope(ResourceKind::Users, Scope::Detail)
}

pub fn stats_prefix() -> KeyPrefix {
    KeyPrefix::scope(ResourceKind::Users, Scope::Stats)
}
