use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::deferred::DeferredTask;
use super::patch::{ApplyPatch, UserPatch, patch_user_page};
use super::rules::invalidation_targets;
use crate::cache::keys::{ResourceKind, role_keys, user_keys};
use crate::cache::models::QueryData;
use crate::cache::operations::QueryStore;

/// 数据同步协调器
///
/// 在查询缓存之上集中维护“哪个变更影响哪些缓存”的规则，
/// 界面代码只需要在变更后调用对应的方法。
#[derive(Clone)]
pub struct DataSync {
    store: QueryStore,
    stats_refresh_delay: Duration,
    pending_stats_refresh: Arc<Mutex<Option<DeferredTask>>>,
}

impl DataSync {
    pub fn new(store: QueryStore, stats_refresh_delay: Duration) -> Self {
        Self {
            store,
            stats_refresh_delay,
            pending_stats_refresh: Arc::new(Mutex::new(None)),
        }
    }

    pub fn store(&self) -> &QueryStore {
        &self.store
    }

    /// 按规则失效某类资源变更影响的所有前缀
    pub fn sync_after(&self, kind: ResourceKind) -> usize {
        let count: usize = invalidation_targets(kind)
            .iter()
            .map(|prefix| self.store.invalidate(prefix))
            .sum();
        tracing::debug!("Synced after {} mutation, {} entries stale", kind.as_str(), count);
        count
    }

    /// 用户新建、更新、删除或改角色之后调用
    pub fn sync_after_user_mutation(&self) -> usize {
        self.sync_after(ResourceKind::Users)
    }

    /// 角色名称或权限变化之后调用
    pub fn sync_after_role_mutation(&self) -> usize {
        self.sync_after(ResourceKind::Roles)
    }

    /// 立即把缓存中该用户的角色改成 `new_role`，包括详情和所有包含该用户的列表。
    ///
    /// 角色统计无法在本地算出，只在延迟之后标记过期。
    pub fn apply_optimistic_role_change(
        &self,
        user_id: &str,
        new_role: &str,
    ) -> OptimisticRoleChange {
        let patch = UserPatch::role(new_role);
        let mut previous_role = None;

        let patched = self.store.set_queries_data(&user_keys::prefix(), |_, data| {
            let next = match data {
                QueryData::User(user) if user.id == user_id => {
                    previous_role.get_or_insert_with(|| user.role.clone());
                    QueryData::User(user.apply_patch(&patch))
                }
                QueryData::UserPage(page) => {
                    if let Some(user) = page.data.iter().find(|user| user.id == user_id) {
                        previous_role.get_or_insert_with(|| user.role.clone());
                    }
                    QueryData::UserPage(patch_user_page(page, user_id, &patch)?)
                }
                _ => return None,
            };
            Some(next)
        });
        tracing::debug!(
            "Optimistic role change for user {} -> {}, {} entries patched",
            user_id,
            new_role,
            patched
        );

        self.schedule_stats_refresh();

        OptimisticRoleChange {
            sync: self.clone(),
            user_id: user_id.to_string(),
            new_role: new_role.to_string(),
            previous_role,
        }
    }

    /// 手动刷新：失效所有缓存，空缓存时什么也不做
    pub fn force_refresh_all(&self) -> usize {
        self.store.invalidate_all()
    }

    /// 取消等待中的角色统计刷新
    pub fn cancel_pending(&self) -> bool {
        self.pending()
            .take()
            .is_some_and(|task| task.cancel())
    }

    pub fn dispose(&self) {
        self.cancel_pending();
    }

    fn schedule_stats_refresh(&self) {
        let store = self.store.clone();
        let task = DeferredTask::schedule(self.stats_refresh_delay, move || {
            store.invalidate(&role_keys::stats_prefix());
        });
        // 新任务会覆盖旧任务，旧任务直接取消
        if let Some(previous) = self.pending().replace(task) {
            previous.cancel();
        }
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, Option<DeferredTask>> {
        self.pending_stats_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// 一次已经应用的乐观角色变更
///
/// 请求成功时调用 `commit`；失败时必须调用 `rollback`，
/// 否则缓存会一直显示错误的角色。
#[must_use = "call commit() or rollback() once the request settles"]
#[derive(Clone)]
pub struct OptimisticRoleChange {
    sync: DataSync,
    user_id: String,
    new_role: String,
    previous_role: Option<String>,
}

impl OptimisticRoleChange {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// 变更前缓存里看到的角色，缓存中没有该用户时为 None
    pub fn previous_role(&self) -> Option<&str> {
        self.previous_role.as_deref()
    }

    pub fn commit(self) {}

    /// 把仍显示乐观角色的条目恢复成原角色，并失效相关缓存，返回失效的条目数
    pub fn rollback(self) -> usize {
        if let Some(previous) = &self.previous_role {
            let restore = UserPatch::role(previous.as_str());
            let user_id = self.user_id.as_str();
            let new_role = self.new_role.as_str();
            self.sync
                .store()
                .set_queries_data(&user_keys::prefix(), |_, data| match data {
                    QueryData::User(user) if user.id == user_id && user.role == new_role => {
                        Some(QueryData::User(user.apply_patch(&restore)))
                    }
                    QueryData::UserPage(page)
                        if page
                            .data
                            .iter()
                            .any(|user| user.id == user_id && user.role == new_role) =>
                    {
                        patch_user_page(page, user_id, &restore).map(QueryData::UserPage)
                    }
                    _ => None,
                });
        }
        tracing::warn!(
            "Rolled back optimistic role change for user {} ({})",
            self.user_id,
            self.new_role
        );
        self.sync.sync_after_user_mutation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{Paginated, Pagination, RoleStats, User, UserFilters, UserStats};
    use crate::cache::keys::QueryKey;
    use crate::cache::operations::{RetryPolicy, StoreConfig};
    use crate::sync::patch::tests::user;

    fn new_sync() -> DataSync {
        let store = QueryStore::create(StoreConfig {
            gc_interval: None,
            retry: RetryPolicy::none(),
            ..StoreConfig::default()
        });
        DataSync::new(store, Duration::from_millis(100))
    }

    fn seed(sync: &DataSync, key: QueryKey, data: QueryData) {
        sync.store().set_data(&key, |_| Some(data));
    }

    fn page(users: Vec<User>) -> QueryData {
        let total = users.len() as u64;
        QueryData::UserPage(Paginated {
            data: users,
            pagination: Pagination::new(1, 10, total),
        })
    }

    fn roles_in(sync: &DataSync, key: &QueryKey) -> Vec<(String, String)> {
        let entry = sync.store().peek(key).unwrap();
        entry
            .data
            .unwrap()
            .as_user_page()
            .unwrap()
            .data
            .iter()
            .map(|u| (u.id.clone(), u.role.clone()))
            .collect()
    }

    #[tokio::test]
    async fn user_mutation_marks_role_stats_stale_immediately() {
        let sync = new_sync();
        seed(
            &sync,
            role_keys::stats(),
            QueryData::RoleStats(RoleStats::from([("admin", 3), ("editor", 7)])),
        );
        seed(&sync, user_keys::detail("5"), QueryData::User(user("5", "viewer")));

        assert_eq!(sync.sync_after_user_mutation(), 2);

        let stats = sync.store().peek(&role_keys::stats()).unwrap();
        assert!(stats.is_stale);
        assert_eq!(stats.data.unwrap().as_role_stats().unwrap().count("editor"), 7);
    }

    #[tokio::test]
    async fn role_mutation_invalidates_roles_and_users() {
        let sync = new_sync();
        seed(&sync, user_keys::detail("5"), QueryData::User(user("5", "viewer")));
        seed(&sync, role_keys::stats(), QueryData::RoleStats(RoleStats::default()));

        assert_eq!(sync.sync_after_role_mutation(), 2);
        assert!(sync.store().peek(&user_keys::detail("5")).unwrap().is_stale);
    }

    #[tokio::test]
    async fn optimistic_role_change_is_visible_synchronously() {
        let sync = new_sync();
        seed(&sync, user_keys::detail("5"), QueryData::User(user("5", "viewer")));

        let change = sync.apply_optimistic_role_change("5", "editor");

        let detail = sync.store().peek(&user_keys::detail("5")).unwrap();
        assert_eq!(detail.data.unwrap().as_user().unwrap().role, "editor");
        assert_eq!(change.previous_role(), Some("viewer"));
        change.commit();
    }

    #[tokio::test]
    async fn optimistic_role_change_patches_every_list_in_place() {
        let sync = new_sync();
        let page_one = user_keys::list(UserFilters::page(1));
        let editors = user_keys::list(UserFilters {
            role: Some("editor".into()),
            ..UserFilters::default()
        });
        seed(&sync, page_one.clone(), page(vec![user("5", "viewer"), user("9", "editor")]));
        seed(&sync, editors.clone(), page(vec![user("9", "editor")]));

        sync.apply_optimistic_role_change("5", "admin").commit();

        assert_eq!(
            roles_in(&sync, &page_one),
            vec![("5".into(), "admin".into()), ("9".into(), "editor".into())]
        );
        assert_eq!(roles_in(&sync, &editors), vec![("9".into(), "editor".into())]);
        assert!(!sync.store().peek(&page_one).unwrap().is_stale);
    }

    #[tokio::test(start_paused = true)]
    async fn role_stats_go_stale_after_the_refresh_delay() {
        let sync = new_sync();
        seed(&sync, role_keys::stats(), QueryData::RoleStats(RoleStats::default()));
        seed(&sync, user_keys::detail("5"), QueryData::User(user("5", "viewer")));

        sync.apply_optimistic_role_change("5", "admin").commit();
        assert!(!sync.store().peek(&role_keys::stats()).unwrap().is_stale);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(sync.store().peek(&role_keys::stats()).unwrap().is_stale);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_stats_refresh_can_be_cancelled() {
        let sync = new_sync();
        seed(&sync, role_keys::stats(), QueryData::RoleStats(RoleStats::default()));

        sync.apply_optimistic_role_change("5", "admin").commit();
        assert!(sync.cancel_pending());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!sync.store().peek(&role_keys::stats()).unwrap().is_stale);
    }

    #[tokio::test]
    async fn rollback_restores_previous_role_and_invalidates() {
        let sync = new_sync();
        let page_one = user_keys::list(UserFilters::page(1));
        seed(&sync, user_keys::detail("5"), QueryData::User(user("5", "viewer")));
        seed(&sync, page_one.clone(), page(vec![user("5", "viewer"), user("9", "editor")]));
        seed(&sync, role_keys::stats(), QueryData::RoleStats(RoleStats::default()));

        let change = sync.apply_optimistic_role_change("5", "admin");
        change.rollback();

        let detail = sync.store().peek(&user_keys::detail("5")).unwrap();
        assert_eq!(detail.data.unwrap().as_user().unwrap().role, "viewer");
        assert!(detail.is_stale);
        assert_eq!(
            roles_in(&sync, &page_one),
            vec![("5".into(), "viewer".into()), ("9".into(), "editor".into())]
        );
        assert!(sync.store().peek(&role_keys::stats()).unwrap().is_stale);
    }

    #[tokio::test]
    async fn rollback_does_not_clobber_newer_server_data() {
        let sync = new_sync();
        seed(&sync, user_keys::detail("5"), QueryData::User(user("5", "viewer")));

        let change = sync.apply_optimistic_role_change("5", "admin");
        // 服务端数据先一步到达
        seed(&sync, user_keys::detail("5"), QueryData::User(user("5", "editor")));
        change.rollback();

        let detail = sync.store().peek(&user_keys::detail("5")).unwrap();
        assert_eq!(detail.data.unwrap().as_user().unwrap().role, "editor");
    }

    #[tokio::test]
    async fn force_refresh_all_is_safe_on_empty_and_repeated_calls() {
        let sync = new_sync();
        assert_eq!(sync.force_refresh_all(), 0);
        assert_eq!(sync.force_refresh_all(), 0);

        seed(&sync, user_keys::stats(), QueryData::UserStats(UserStats::default()));
        assert_eq!(sync.force_refresh_all(), 1);
        assert_eq!(sync.force_refresh_all(), 1);
        assert_eq!(sync.store().in_flight_count(), 0);
    }
}
