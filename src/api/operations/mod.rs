// 远程数据访问服务
// 每种资源一个服务，负责请求和错误转换

pub mod client;
pub mod role;
pub mod user;

// 重新导出常用服务
pub use client::ApiClient;
pub use role::RoleService;
pub use user::UserService;
