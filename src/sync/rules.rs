//! 变更之后需要失效的缓存前缀

use crate::cache::keys::{KeyPrefix, ResourceKind, role_keys, user_keys};

/// 某类资源发生变更后必须标记过期的前缀。
///
/// 角色统计由用户数据推导，所以用户变更也要失效 `roles.stats`。
/// 宁可多失效一次后台请求，也不能漏掉聚合视图。
pub fn invalidation_targets(kind: ResourceKind) -> Vec<KeyPrefix> {
    match kind {
        ResourceKind::Users => vec![
            user_keys::prefix(),
            role_keys::stats_prefix(),
            user_keys::stats_prefix(),
        ],
        ResourceKind::Roles => vec![role_keys::prefix(), user_keys::prefix()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{RoleFilters, UserFilters};
    use crate::cache::keys::QueryKey;

    fn covered(kind: ResourceKind, key: &QueryKey) -> bool {
        invalidation_targets(kind)
            .iter()
            .any(|prefix| prefix.matches(key))
    }

    #[test]
    fn every_mutation_invalidates_its_own_resource() {
        for kind in ResourceKind::ALL {
            let own = match kind {
                ResourceKind::Users => user_keys::list(UserFilters::default()),
                ResourceKind::Roles => role_keys::list(RoleFilters::default()),
            };
            assert!(covered(kind, &own), "{kind:?}");
        }
    }

    #[test]
    fn aggregates_derived_from_users_are_invalidated() {
        assert!(covered(ResourceKind::Users, &role_keys::stats()));
        assert!(covered(ResourceKind::Users, &user_keys::stats()));
        assert!(!covered(ResourceKind::Users, &role_keys::detail("admin")));
    }

    #[test]
    fn role_changes_refresh_user_views() {
        assert!(covered(ResourceKind::Roles, &user_keys::detail("5")));
        assert!(covered(ResourceKind::Roles, &role_keys::stats()));
    }
}
