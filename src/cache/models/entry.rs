use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use super::data::QueryData;
use crate::cache::keys::QueryKey;
use crate::error::ServiceError;

/// 缓存条目快照
///
/// 条目本身只由 `QueryStore` 持有，调用方拿到的都是克隆出来的快照。
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: QueryKey,
    /// 最近一次已知的数据，失效或请求失败时保留
    pub data: Option<QueryData>,
    /// 最近一次成功拉取的时间
    pub fetched_at: Option<Instant>,
    /// 数据最近一次被写入的墙上时间
    pub updated_at: Option<DateTime<Utc>>,
    pub is_stale: bool,
    pub subscriber_count: usize,
    /// 最近一次拉取失败的原因，成功后清空
    pub error: Option<ServiceError>,
    pub failure_count: u32,
    /// 每次变更递增
    pub version: u64,
}

impl CacheEntry {
    pub fn empty(key: QueryKey) -> Self {
        Self {
            key,
            data: None,
            fetched_at: None,
            updated_at: None,
            is_stale: false,
            subscriber_count: 0,
            error: None,
            failure_count: 0,
            version: 0,
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// 有数据、未失效且未超过 stale_time
    pub fn is_fresh(&self, stale_time: Duration, now: Instant) -> bool {
        if self.is_stale || self.data.is_none() {
            return false;
        }
        self.fetched_at
            .is_some_and(|at| now.saturating_duration_since(at) < stale_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::RoleStats;
    use crate::cache::keys::role_keys;

    #[tokio::test(start_paused = true)]
    async fn freshness_expires_after_stale_time() {
        let mut entry = CacheEntry::empty(role_keys::stats());
        entry.data = Some(QueryData::RoleStats(RoleStats::default()));
        entry.fetched_at = Some(Instant::now());

        assert!(entry.is_fresh(Duration::from_secs(60), Instant::now()));
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!entry.is_fresh(Duration::from_secs(60), Instant::now()));
    }

    #[test]
    fn stale_or_empty_entries_are_never_fresh() {
        let now = Instant::now();
        let mut entry = CacheEntry::empty(role_keys::stats());
        entry.fetched_at = Some(now);
        assert!(!entry.is_fresh(Duration::from_secs(60), now));

        entry.data = Some(QueryData::RoleStats(RoleStats::default()));
        entry.is_stale = true;
        assert!(!entry.is_fresh(Duration::from_secs(60), now));
    }
}
