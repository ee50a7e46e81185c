// 数据同步模块
// 在查询缓存之上实现跨资源的失效规则和乐观更新

pub mod coordinator;
pub mod deferred;
pub mod patch;
pub mod rules;

pub use coordinator::{DataSync, OptimisticRoleChange};
pub use deferred::DeferredTask;
pub use patch::{ApplyPatch, RolePatch, UserPatch, patch_user_page};
pub use rules::invalidation_targets;
