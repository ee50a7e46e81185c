use crate::api::models::{Paginated, Role, RoleStats, User, UserStats};

/// 可缓存的服务端数据
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    UserPage(Paginated<User>),
    User(User),
    UserStats(UserStats),
    RolePage(Paginated<Role>),
    Role(Role),
    RoleStats(RoleStats),
}

impl QueryData {
    pub fn as_user(&self) -> Option<&User> {
        match self {
            QueryData::User(user) => Some(user),
            _ => None,
        }
    }

    pub fn as_user_page(&self) -> Option<&Paginated<User>> {
        match self {
            QueryData::UserPage(page) => Some(page),
            _ => None,
        }
    }

    pub fn as_user_stats(&self) -> Option<&UserStats> {
        match self {
            QueryData::UserStats(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn as_role(&self) -> Option<&Role> {
        match self {
            QueryData::Role(role) => Some(role),
            _ => None,
        }
    }

    pub fn as_role_page(&self) -> Option<&Paginated<Role>> {
        match self {
            QueryData::RolePage(page) => Some(page),
            _ => None,
        }
    }

    pub fn as_role_stats(&self) -> Option<&RoleStats> {
        match self {
            QueryData::RoleStats(stats) => Some(stats),
            _ => None,
        }
    }
}
