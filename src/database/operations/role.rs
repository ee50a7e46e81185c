// 角色数据操作

use chrono::Utc;
use uuid::Uuid;

use crate::api::models::{
    CreateRoleRequest, Paginated, Role, RoleFilters, RoleStats, UpdateRoleRequest,
};
use crate::database::MockDatabase;
use crate::error::DatabaseError;
use crate::utils::slugify;

use super::{DEFAULT_PAGE_SIZE, contains_ignore_case};

impl MockDatabase {
    pub fn list_roles(&self, filters: &RoleFilters) -> Paginated<Role> {
        let matched: Vec<Role> = self
            .roles
            .iter()
            .filter(|role| {
                filters.search.as_deref().is_none_or(|q| {
                    contains_ignore_case(&role.name, q)
                        || contains_ignore_case(&role.display_name, q)
                })
            })
            .filter(|role| filters.is_active.is_none_or(|active| role.is_active == active))
            .cloned()
            .collect();

        Paginated::from_items(
            matched,
            filters.page.unwrap_or(1),
            filters.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    pub fn find_role(&self, role_id: &str) -> Result<Role, DatabaseError> {
        self.roles
            .iter()
            .find(|role| role.id == role_id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("role {role_id}")))
    }

    /// 角色名称统一转成 slug 形式
    pub fn create_role(&mut self, req: CreateRoleRequest) -> Result<Role, DatabaseError> {
        let name = slugify(&req.name);
        if name.is_empty() {
            return Err(DatabaseError::Invalid("role name is required".to_string()));
        }
        if self.roles.iter().any(|role| role.name == name) {
            return Err(DatabaseError::Conflict(format!("role {name} already exists")));
        }

        let now = Utc::now();
        let role = Role {
            id: Uuid::new_v4().to_string(),
            name,
            display_name: req.display_name,
            description: req.description,
            permissions: req.permissions,
            is_active: req.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.roles.push(role.clone());
        tracing::debug!("Created role {}", role.name);
        Ok(role)
    }

    pub fn update_role(
        &mut self,
        role_id: &str,
        req: UpdateRoleRequest,
    ) -> Result<Role, DatabaseError> {
        let role = self
            .roles
            .iter_mut()
            .find(|role| role.id == role_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("role {role_id}")))?;

        if let Some(display_name) = req.display_name {
            role.display_name = display_name;
        }
        if let Some(description) = req.description {
            role.description = description;
        }
        if let Some(permissions) = req.permissions {
            role.permissions = permissions;
        }
        if let Some(is_active) = req.is_active {
            role.is_active = is_active;
        }
        role.updated_at = Utc::now();
        Ok(role.clone())
    }

    /// 仍有用户使用的角色不能删除
    pub fn delete_role(&mut self, role_id: &str) -> Result<(), DatabaseError> {
        let index = self
            .roles
            .iter()
            .position(|role| role.id == role_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("role {role_id}")))?;

        let name = &self.roles[index].name;
        let assigned = self.users.iter().filter(|user| &user.role == name).count();
        if assigned > 0 {
            return Err(DatabaseError::Conflict(format!(
                "role {name} is still assigned to {assigned} users"
            )));
        }

        let removed = self.roles.remove(index);
        tracing::debug!("Deleted role {}", removed.name);
        Ok(())
    }

    /// 每个角色的用户数量，没有用户的角色计为 0
    pub fn role_stats(&self) -> RoleStats {
        let mut stats = RoleStats::default();
        for role in &self.roles {
            stats.0.insert(role.name.clone(), 0);
        }
        for user in &self.users {
            *stats.0.entry(user.role.clone()).or_insert(0) += 1;
        }
        stats
    }
}
