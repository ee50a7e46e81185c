#![allow(dead_code)]

use dseza_admin::{
    AppState,
    admin::AdminData,
    api::operations::ApiClient,
    config::Config,
    database::MockDatabase,
    routes,
};

/// 在随机端口启动模拟后端，返回接口地址
pub async fn spawn_backend(seed_users: usize) -> String {
    let state = AppState::new(MockDatabase::seeded(seed_users), Config::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, routes::create_router(state)).await.unwrap();
    });
    format!("http://{addr}{}", routes::API_PREFIX)
}

pub fn test_config(base_url: &str) -> Config {
    Config {
        api_base_url: base_url.to_string(),
        retry_attempts: 1,
        stats_refresh_delay_ms: 20,
        ..Config::default()
    }
}

pub async fn admin(seed_users: usize) -> AdminData {
    let base_url = spawn_backend(seed_users).await;
    AdminData::with_client(&test_config(&base_url), ApiClient::new(base_url))
}
