//! 乐观更新用的纯函数补丁

use crate::api::models::{Paginated, Role, UpdateRoleRequest, UpdateUserRequest, User};

/// 把补丁应用到实体上，返回新实体，不修改原值
pub trait ApplyPatch: Sized {
    type Patch;

    fn apply_patch(&self, patch: &Self::Patch) -> Self;
}

/// 用户补丁，None 字段保持原值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

impl UserPatch {
    pub fn role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Self::default()
        }
    }
}

impl From<&UpdateUserRequest> for UserPatch {
    fn from(req: &UpdateUserRequest) -> Self {
        Self {
            email: req.email.clone(),
            full_name: req.full_name.clone(),
            role: req.role.clone(),
            is_active: req.is_active,
        }
    }
}

impl ApplyPatch for User {
    type Patch = UserPatch;

    fn apply_patch(&self, patch: &UserPatch) -> Self {
        let mut user = self.clone();
        if let Some(email) = &patch.email {
            user.email = email.clone();
        }
        if let Some(full_name) = &patch.full_name {
            user.full_name = full_name.clone();
        }
        if let Some(role) = &patch.role {
            user.role = role.clone();
        }
        if let Some(is_active) = patch.is_active {
            user.is_active = is_active;
        }
        user
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePatch {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl From<&UpdateRoleRequest> for RolePatch {
    fn from(req: &UpdateRoleRequest) -> Self {
        Self {
            display_name: req.display_name.clone(),
            description: req.description.clone(),
            permissions: req.permissions.clone(),
            is_active: req.is_active,
        }
    }
}

impl ApplyPatch for Role {
    type Patch = RolePatch;

    fn apply_patch(&self, patch: &RolePatch) -> Self {
        let mut role = self.clone();
        if let Some(display_name) = &patch.display_name {
            role.display_name = display_name.clone();
        }
        if let Some(description) = &patch.description {
            role.description = description.clone();
        }
        if let Some(permissions) = &patch.permissions {
            role.permissions = permissions.clone();
        }
        if let Some(is_active) = patch.is_active {
            role.is_active = is_active;
        }
        role
    }
}

/// 对列表中 id 匹配的用户应用补丁，保持顺序。列表不含该用户时返回 None
pub fn patch_user_page(
    page: &Paginated<User>,
    user_id: &str,
    patch: &UserPatch,
) -> Option<Paginated<User>> {
    if !page.data.iter().any(|user| user.id == user_id) {
        return None;
    }
    let data = page
        .data
        .iter()
        .map(|user| {
            if user.id == user_id {
                user.apply_patch(patch)
            } else {
                user.clone()
            }
        })
        .collect();
    Some(Paginated {
        data,
        pagination: page.pagination.clone(),
    })
}
