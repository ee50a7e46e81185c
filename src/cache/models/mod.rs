/// 缓存数据模型
/// 定义缓存条目和可缓存数据的结构体
pub mod data;
pub mod entry;

// 重新导出常用类型
pub use data::QueryData;
pub use entry::CacheEntry;
