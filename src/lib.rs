use std::sync::Arc;

use config::Config;
use database::MockDatabase;
use tokio::sync::RwLock;

pub mod admin;
pub mod api;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod sync;
pub mod utils;

/// 模拟后端的共享状态
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<RwLock<MockDatabase>>,
    pub config: Config,
}

impl AppState {
    pub fn new(db: MockDatabase, config: Config) -> Self {
        Self {
            db: Arc::new(RwLock::new(db)),
            config,
        }
    }
}
