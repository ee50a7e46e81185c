/// 缓存操作
/// 提供查询缓存的读写、失效和重试实现

// 查询缓存本体
pub mod store;

// 拉取失败的重试策略
pub mod retry;

// 重新导出常用操作
pub use retry::RetryPolicy;
pub use store::{FetchResult, Fetcher, QueryStore, StoreConfig, Subscription, fetcher};
