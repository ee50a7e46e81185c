use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::error::ServiceError;

/// 拉取失败时的重试策略，指数退避，次数有上限
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 包括第一次在内的最大尝试次数
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// 只尝试一次
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// 第 `attempt` 次失败之后等待的时间
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// 执行 `op`，只重试可重试的错误
    pub async fn run<T, F, Fut>(&self, label: impl Display, mut op: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        "Fetch {} failed (attempt {}/{}), retrying in {:?}: {}",
                        label,
                        attempt,
                        max_attempts,
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!("Fetch {} failed after {} attempt(s): {}", label, attempt, err);
                    return Err(err);
                }
            }
        }
    }
}
