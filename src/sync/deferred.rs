use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// 延迟执行的任务，可以取消
///
/// 不在 tokio 运行时内时立即执行。drop 不会取消任务。
#[derive(Debug)]
pub struct DeferredTask {
    handle: Option<JoinHandle<()>>,
}

impl DeferredTask {
    pub fn schedule<F>(delay: Duration, job: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => Self {
                handle: Some(handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    job();
                })),
            },
            Err(_) => {
                job();
                Self { handle: None }
            }
        }
    }

    /// 取消尚未执行的任务，返回取消前是否仍在等待
    pub fn cancel(&self) -> bool {
        match &self.handle {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test(start_paused = true)]
    async fn runs_after_the_delay() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let task = DeferredTask::schedule(Duration::from_millis(100), move || {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert!(!fired.load(Ordering::SeqCst));
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(fired.load(Ordering::SeqCst));
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_runs() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let task = DeferredTask::schedule(Duration::from_millis(100), move || {
            flag.store(true, Ordering::SeqCst);
        });

        assert!(task.cancel());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!fired.load(Ordering::SeqCst));
        assert!(!task.cancel());
    }

    #[test]
    fn runs_inline_without_a_runtime() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let task = DeferredTask::schedule(Duration::from_secs(5), move || {
            flag.store(true, Ordering::SeqCst);
        });
        assert!(fired.load(Ordering::SeqCst));
        assert!(task.is_finished());
    }
}
