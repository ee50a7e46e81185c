mod common;

use std::time::Duration;

use dseza_admin::api::models::{CreateUserRequest, UserFilters};
use dseza_admin::cache::keys::{role_keys, user_keys};
use dseza_admin::error::ServiceError;
use tokio::time::timeout;

#[tokio::test]
async fn reads_are_served_from_cache_until_invalidated() {
    let admin = common::admin(12).await;
    let store = admin.sync.store().clone();

    let first = admin.users.list(UserFilters::page(1)).await.unwrap();
    let second = admin.users.list(UserFilters::page(1)).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(store.len(), 1);

    assert_eq!(admin.refresh_all(), 1);
    assert!(store.peek(&user_keys::list(UserFilters::page(1))).unwrap().is_stale);
    admin.users.list(UserFilters::page(1)).await.unwrap();
    assert!(!store.peek(&user_keys::list(UserFilters::page(1))).unwrap().is_stale);
}

#[tokio::test]
async fn change_role_updates_lists_and_role_counts() {
    let admin = common::admin(12).await;
    let store = admin.sync.store().clone();

    admin.users.list(UserFilters::page(1)).await.unwrap();
    let before = admin.roles.stats().await.unwrap();

    // 用户 2 是编辑
    let user = admin.users.change_role("2", "admin").await.unwrap();
    assert_eq!(user.role, "admin");

    let list = store.peek(&user_keys::list(UserFilters::page(1))).unwrap();
    let page = list.data.as_ref().and_then(|d| d.as_user_page()).unwrap();
    assert_eq!(page.data[1].id, "2");
    assert_eq!(page.data[1].role, "admin");
    assert!(list.is_stale);
    assert!(store.peek(&role_keys::stats()).unwrap().is_stale);

    let after = admin.roles.stats().await.unwrap();
    assert_eq!(after.count("admin"), before.count("admin") + 1);
    assert_eq!(after.count("editor"), before.count("editor") - 1);

    let detail = store.peek(&user_keys::detail("2")).unwrap();
    assert_eq!(detail.data.as_ref().and_then(|d| d.as_user()).unwrap().role, "admin");
}

#[tokio::test]
async fn failed_role_change_restores_cached_role() {
    let admin = common::admin(12).await;
    let store = admin.sync.store().clone();

    admin.users.list(UserFilters::page(1)).await.unwrap();

    let err = admin.users.change_role("2", "ghost").await.unwrap_err();
    match err {
        ServiceError::StaleOptimistic(inner) => {
            assert!(matches!(*inner, ServiceError::Validation { status: 422, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let list = store.peek(&user_keys::list(UserFilters::page(1))).unwrap();
    let page = list.data.as_ref().and_then(|d| d.as_user_page()).unwrap();
    assert_eq!(page.data[1].role, "editor");
    assert!(list.is_stale);

    let fresh = admin.users.list(UserFilters::page(1)).await.unwrap();
    assert_eq!(fresh.data[1].role, "editor");
}

#[tokio::test]
async fn subscribed_list_refetches_after_create() {
    let admin = common::admin(12).await;
    let mut subscription = admin.users.subscribe_list(UserFilters::page(1));

    let total_items = |sub: &dseza_admin::cache::operations::Subscription| {
        sub.current()
            .and_then(|entry| entry.data)
            .and_then(|data| data.as_user_page().map(|page| page.pagination.total_items))
    };

    timeout(Duration::from_secs(5), async {
        while total_items(&subscription) != Some(12) {
            assert!(subscription.changed().await);
        }
    })
    .await
    .unwrap();

    admin
        .users
        .create(&CreateUserRequest {
            username: "thu.dang".to_string(),
            email: "thu.dang@dseza.danang.gov.vn".to_string(),
            full_name: "Đặng Thị Thu".to_string(),
            role: "viewer".to_string(),
            is_active: Some(true),
        })
        .await
        .unwrap();

    timeout(Duration::from_secs(5), async {
        while total_items(&subscription) != Some(13) {
            assert!(subscription.changed().await);
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn deleted_user_detail_is_evicted() {
    let admin = common::admin(6).await;
    let store = admin.sync.store().clone();

    admin.users.get("3").await.unwrap();
    assert!(store.peek(&user_keys::detail("3")).is_some());

    admin.users.delete("3").await.unwrap();
    assert!(store.peek(&user_keys::detail("3")).is_none());
    assert!(matches!(admin.users.get("3").await, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn disposed_data_layer_rejects_reads() {
    let admin = common::admin(3).await;
    admin.dispose();
    assert!(matches!(
        admin.users.list(UserFilters::page(1)).await,
        Err(ServiceError::Disposed)
    ));
}
