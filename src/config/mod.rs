use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::cache::operations::{RetryPolicy, StoreConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// 管理后台 REST 接口地址
    pub api_base_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub stale_time_secs: u64,
    pub gc_time_secs: u64,
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    /// 乐观改角色之后多久刷新角色统计
    pub stats_refresh_delay_ms: u64,
    /// 模拟后端初始生成的用户数量
    pub mock_seed_users: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000/api".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            stale_time_secs: 300,
            gc_time_secs: 300,
            retry_attempts: 3,
            retry_base_delay_ms: 1000,
            retry_max_delay_ms: 30_000,
            stats_refresh_delay_ms: 100,
            mock_seed_users: 24,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 从任意来源读取配置，缺失的变量使用默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Ok(Config {
            api_base_url: lookup("API_BASE_URL").unwrap_or(defaults.api_base_url),
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_or(&lookup, "SERVER_PORT", defaults.server_port)?,
            stale_time_secs: parse_or(&lookup, "QUERY_STALE_TIME_SECS", defaults.stale_time_secs)?,
            gc_time_secs: parse_or(&lookup, "QUERY_GC_TIME_SECS", defaults.gc_time_secs)?,
            retry_attempts: parse_or(&lookup, "QUERY_RETRY_ATTEMPTS", defaults.retry_attempts)?,
            retry_base_delay_ms: parse_or(
                &lookup,
                "QUERY_RETRY_BASE_DELAY_MS",
                defaults.retry_base_delay_ms,
            )?,
            retry_max_delay_ms: parse_or(
                &lookup,
                "QUERY_RETRY_MAX_DELAY_MS",
                defaults.retry_max_delay_ms,
            )?,
            stats_refresh_delay_ms: parse_or(
                &lookup,
                "STATS_REFRESH_DELAY_MS",
                defaults.stats_refresh_delay_ms,
            )?,
            mock_seed_users: parse_or(&lookup, "MOCK_SEED_USERS", defaults.mock_seed_users)?,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            stale_time: Duration::from_secs(self.stale_time_secs),
            gc_time: Duration::from_secs(self.gc_time_secs),
            retry: self.retry_policy(),
            ..StoreConfig::default()
        }
    }

    pub fn stats_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.stats_refresh_delay_ms)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn missing_variables_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.stats_refresh_delay(), Duration::from_millis(100));
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn variables_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("API_BASE_URL", "http://admin.dseza.local/api"),
            ("QUERY_STALE_TIME_SECS", "30"),
            ("QUERY_RETRY_ATTEMPTS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "http://admin.dseza.local/api");
        assert_eq!(config.store_config().stale_time, Duration::from_secs(30));
        assert_eq!(config.store_config().retry.max_attempts, 5);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[("SERVER_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SERVER_PORT", .. }));
    }
}
