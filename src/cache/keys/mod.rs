/// 查询缓存键模块
///
/// 每个缓存条目由一个 `QueryKey` 标识。键会展开成一串有序的段
/// （`[users]`、`[users, list, filters]`、`[users, detail, id]` ……），
/// 失效操作按前缀匹配这些段。
use std::fmt;

use crate::api::models::{RoleFilters, UserFilters};

// 用户缓存键模块
pub mod user_keys;

// 角色缓存键模块
pub mod role_keys;

/// 资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Users,
    Roles,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Users, ResourceKind::Roles];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Users => "users",
            ResourceKind::Roles => "roles",
        }
    }
}

/// 资源下的查询范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    List,
    Detail,
    Stats,
}

/// 键路径中的一段
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Resource(ResourceKind),
    Scope(Scope),
    Id(String),
    UserFilters(UserFilters),
    RoleFilters(RoleFilters),
}

/// 缓存查询键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    UsersAll,
    UsersList(UserFilters),
    UsersDetail(String),
    UsersStats,
    RolesAll,
    RolesList(RoleFilters),
    RolesDetail(String),
    RolesStats,
}

impl QueryKey {
    pub fn resource(&self) -> ResourceKind {
        match self {
            QueryKey::UsersAll
            | QueryKey::UsersList(_)
            | QueryKey::UsersDetail(_)
            | QueryKey::UsersStats => ResourceKind::Users,
            QueryKey::RolesAll
            | QueryKey::RolesList(_)
            | QueryKey::RolesDetail(_)
            | QueryKey::RolesStats => ResourceKind::Roles,
        }
    }

    /// 展开成有序的键路径
    pub fn path(&self) -> Vec<Segment> {
        let resource = Segment::Resource(self.resource());
        match self {
            QueryKey::UsersAll | QueryKey::RolesAll => vec![resource],
            QueryKey::UsersList(filters) => vec![
                resource,
                Segment::Scope(Scope::List),
                Segment::UserFilters(filters.clone()),
            ],
            QueryKey::RolesList(filters) => vec![
                resource,
                Segment::Scope(Scope::List),
                Segment::RoleFilters(filters.clone()),
            ],
            QueryKey::UsersDetail(id) | QueryKey::RolesDetail(id) => vec![
                resource,
                Segment::Scope(Scope::Detail),
                Segment::Id(id.clone()),
            ],
            QueryKey::UsersStats | QueryKey::RolesStats => {
                vec![resource, Segment::Scope(Scope::Stats)]
            }
        }
    }

    pub fn extends(&self, prefix: &KeyPrefix) -> bool {
        prefix.matches(self)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resource = self.resource().as_str();
        match self {
            QueryKey::UsersAll | QueryKey::RolesAll => write!(f, "{resource}.all"),
            QueryKey::UsersList(filters) => write!(f, "{resource}.list({filters:?})"),
            QueryKey::RolesList(filters) => write!(f, "{resource}.list({filters:?})"),
            QueryKey::UsersDetail(id) | QueryKey::RolesDetail(id) => {
                write!(f, "{resource}.detail({id})")
            }
            QueryKey::UsersStats | QueryKey::RolesStats => write!(f, "{resource}.stats"),
        }
    }
}

/// 键前缀，空前缀匹配所有键
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPrefix(Vec<Segment>);

impl KeyPrefix {
    pub fn all() -> Self {
        Self(Vec::new())
    }

    pub fn resource(kind: ResourceKind) -> Self {
        Self(vec![Segment::Resource(kind)])
    }

    pub fn scope(kind: ResourceKind, scope: Scope) -> Self {
        Self(vec![Segment::Resource(kind), Segment::Scope(scope)])
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        let path = key.path();
        path.len() >= self.0.len() && path.iter().zip(&self.0).all(|(a, b)| a == b)
    }
}

impl From<&QueryKey> for KeyPrefix {
    fn from(key: &QueryKey) -> Self {
        Self(key.path())
    }
}

impl From<QueryKey> for KeyPrefix {
    fn from(key: QueryKey) -> Self {
        Self::from(&key)
    }
}
