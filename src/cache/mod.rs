// 缓存模块
// 包含查询键、缓存条目和查询缓存的操作逻辑

pub mod keys;
pub mod models;
pub mod operations;

// 重新导出常用类型和函数，方便其他模块使用
pub use keys::{KeyPrefix, QueryKey, ResourceKind, role_keys, user_keys};
pub use models::{CacheEntry, QueryData};
pub use operations::{Fetcher, QueryStore, RetryPolicy, StoreConfig, Subscription, fetcher};
