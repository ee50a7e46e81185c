// API 模块
// 数据结构和访问管理后台接口的服务

pub mod models;
pub mod operations;
