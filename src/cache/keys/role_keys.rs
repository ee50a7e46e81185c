use super::{KeyPrefix, QueryKey, ResourceKind, Scope};
use crate::api::models::RoleFilters;

/// 全部角色，也是所有角色键的根
pub fn all() -> QueryKey {
    QueryKey::RolesAll
}

/// 生成角色列表缓存键
pub fn list(filters: RoleFilters) -> QueryKey {
    QueryKey::RolesList(filters)
}

/// 生成角色详情缓存键
pub fn detail(role_id: impl Into<String>) -> QueryKey {
    QueryKey::RolesDetail(role_id.into())
}

/// 每个角色的用户数量
pub fn stats() -> QueryKey {
    QueryKey::RolesStats
}

pub fn prefix() -> KeyPrefix {
    KeyPrefix::resource(ResourceKind::Roles)
}

pub fn lists() -> KeyPrefix {
    KeyPrefix::scope(ResourceKind::Roles, Scope::List)
}

pub fn details() -> KeyPrefix {
    KeyPrefix::scope(ResourceKind::Roles, Scope::Detail)
}

pub fn stats_prefix() -> KeyPrefix {
    KeyPrefix::scope(ResourceKind::Roles, Scope::Stats)
}
