// 数据库模块
// 模拟后端使用的内存数据库，以及初始数据生成

pub mod operations; // 用户和角色的增删改查
pub mod seed; // 确定性的初始数据

use crate::api::models::{Role, User};

/// 内存数据库，按插入顺序保存用户和角色
#[derive(Debug, Clone, Default)]
pub struct MockDatabase {
    users: Vec<User>,
    roles: Vec<Role>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// 生成 `user_count` 个用户和默认角色
    pub fn seeded(user_count: usize) -> Self {
        let roles = seed::roles();
        let users = seed::users(user_count, &roles);
        tracing::info!("Seeded mock database with {} users and {} roles", users.len(), roles.len());
        Self { users, roles }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }
}
