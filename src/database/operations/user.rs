// 用户数据操作

use chrono::Utc;
use uuid::Uuid;

use crate::api::models::{
    CreateUserRequest, Paginated, UpdateUserRequest, User, UserFilters, UserStats,
};
use crate::database::MockDatabase;
use crate::error::DatabaseError;

use super::{DEFAULT_PAGE_SIZE, contains_ignore_case, validate_email};

impl MockDatabase {
    /// 按条件分页查询用户，保持插入顺序
    pub fn list_users(&self, filters: &UserFilters) -> Paginated<User> {
        let matched: Vec<User> = self
            .users
            .iter()
            .filter(|user| {
                filters.search.as_deref().is_none_or(|q| {
                    contains_ignore_case(&user.username, q)
                        || contains_ignore_case(&user.email, q)
                        || contains_ignore_case(&user.full_name, q)
                })
            })
            .filter(|user| filters.role.as_deref().is_none_or(|role| user.role == role))
            .filter(|user| filters.is_active.is_none_or(|active| user.is_active == active))
            .cloned()
            .collect();

        Paginated::from_items(
            matched,
            filters.page.unwrap_or(1),
            filters.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    pub fn find_user(&self, user_id: &str) -> Result<User, DatabaseError> {
        self.users
            .iter()
            .find(|user| user.id == user_id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("user {user_id}")))
    }

    pub fn create_user(&mut self, req: CreateUserRequest) -> Result<User, DatabaseError> {
        let username = req.username.trim().to_string();
        if username.is_empty() {
            return Err(DatabaseError::Invalid("username is required".to_string()));
        }
        validate_email(&req.email)?;
        self.ensure_role_exists(&req.role)?;

        if self.users.iter().any(|u| u.username.eq_ignore_ascii_case(&username)) {
            return Err(DatabaseError::Conflict(format!("username {username} is already taken")));
        }
        self.ensure_email_free(&req.email, None)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            username,
            email: req.email,
            role: req.role,
            is_active: req.is_active.unwrap_or(true),
            full_name: req.full_name,
            created_at: now,
            updated_at: now,
        };
        self.users.push(user.clone());
        tracing::debug!("Created user {}", user.id);
        Ok(user)
    }

    pub fn update_user(
        &mut self,
        user_id: &str,
        req: UpdateUserRequest,
    ) -> Result<User, DatabaseError> {
        // 先校验再写入，失败时记录保持不变
        if let Some(email) = &req.email {
            validate_email(email)?;
            self.ensure_email_free(email, Some(user_id))?;
        }
        if let Some(role) = &req.role {
            self.ensure_role_exists(role)?;
        }

        let user = self
            .users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {user_id}")))?;

        if let Some(email) = req.email {
            user.email = email;
        }
        if let Some(full_name) = req.full_name {
            user.full_name = full_name;
        }
        if let Some(role) = req.role {
            user.role = role;
        }
        if let Some(is_active) = req.is_active {
            user.is_active = is_active;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    pub fn delete_user(&mut self, user_id: &str) -> Result<(), DatabaseError> {
        let index = self
            .users
            .iter()
            .position(|user| user.id == user_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {user_id}")))?;
        self.users.remove(index);
        tracing::debug!("Deleted user {}", user_id);
        Ok(())
    }

    pub fn user_stats(&self) -> UserStats {
        let total = self.users.len() as u64;
        let active = self.users.iter().filter(|user| user.is_active).count() as u64;
        UserStats {
            total,
            active,
            inactive: total - active,
        }
    }

    fn ensure_role_exists(&self, role: &str) -> Result<(), DatabaseError> {
        if self.roles.iter().any(|r| r.name == role) {
            Ok(())
        } else {
            Err(DatabaseError::Invalid(format!("unknown role {role}")))
        }
    }

    fn ensure_email_free(&self, email: &str, except: Option<&str>) -> Result<(), DatabaseError> {
        let taken = self
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id.as_str()) != except);
        if taken {
            Err(DatabaseError::Conflict(format!("email {email} is already in use")))
        } else {
            Ok(())
        }
    }
}
