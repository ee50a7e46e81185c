use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::retry::RetryPolicy;
use crate::cache::keys::{KeyPrefix, QueryKey};
use crate::cache::models::{CacheEntry, QueryData};
use crate::error::ServiceError;

pub type FetchResult = Result<QueryData, ServiceError>;

/// 拉取某个键数据的异步函数，可以被多次调用
pub type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, FetchResult> + Send + Sync>;

type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// 把普通的异步闭包包装成 `Fetcher`
pub fn fetcher<F, Fut>(f: F) -> Fetcher
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FetchResult> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// 查询缓存配置
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// 拉取成功后多久内视为新鲜数据
    pub stale_time: Duration,
    /// 没有订阅者之后条目保留多久
    pub gc_time: Duration,
    /// 后台清理间隔，None 表示只能手动调用 collect_garbage
    pub gc_interval: Option<Duration>,
    pub retry: RetryPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            gc_time: Duration::from_secs(5 * 60),
            gc_interval: Some(Duration::from_secs(60)),
            retry: RetryPolicy::default(),
        }
    }
}

struct Slot {
    /// 条目被删除后重新创建会得到新的 id
    id: u64,
    entry: CacheEntry,
    fetcher: Option<Fetcher>,
    /// 每次失效递增，用来识别拉取期间发生的失效
    generation: u64,
    inactive_since: Option<Instant>,
    notify: watch::Sender<u64>,
}

impl Slot {
    fn new(key: QueryKey, id: u64, now: Instant) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            id,
            entry: CacheEntry::empty(key),
            fetcher: None,
            generation: 0,
            inactive_since: Some(now),
            notify,
        }
    }

    fn touch(&mut self) {
        self.entry.version += 1;
        self.notify.send_replace(self.entry.version);
    }

    fn mark_stale(&mut self) {
        self.generation += 1;
        if !self.entry.is_stale {
            self.entry.is_stale = true;
            self.touch();
        }
    }

    fn write(&mut self, data: QueryData) {
        self.entry.data = Some(data);
        self.entry.updated_at = Some(Utc::now());
        self.touch();
    }

    fn resolve(&mut self, data: QueryData, generation: u64, now: Instant) {
        self.entry.fetched_at = Some(now);
        self.entry.error = None;
        self.entry.failure_count = 0;
        // 拉取期间又被失效过，结果仍然视为过期
        self.entry.is_stale = self.generation != generation;
        self.write(data);
    }

    fn reject(&mut self, err: ServiceError) {
        self.entry.error = Some(err);
        self.entry.failure_count += 1;
        self.touch();
    }
}

struct InFlight {
    id: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct StoreState {
    slots: HashMap<QueryKey, Slot>,
    in_flight: HashMap<QueryKey, InFlight>,
    next_id: u64,
    disposed: bool,
}

impl StoreState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn slot_mut(&mut self, key: &QueryKey, now: Instant) -> &mut Slot {
        let StoreState { slots, next_id, .. } = self;
        slots.entry(key.clone()).or_insert_with(|| {
            *next_id += 1;
            Slot::new(key.clone(), *next_id, now)
        })
    }

    fn collect(&mut self, gc_time: Duration, now: Instant) -> usize {
        let StoreState {
            slots, in_flight, ..
        } = self;
        let before = slots.len();
        slots.retain(|key, slot| {
            slot.entry.subscriber_count > 0
                || in_flight.contains_key(key)
                || slot
                    .inactive_since
                    .is_none_or(|since| now.saturating_duration_since(since) < gc_time)
        });
        before - slots.len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 客户端查询缓存
///
/// 以 `QueryKey` 为键保存服务端数据，负责请求去重、失效和乐观写入。
/// 克隆得到的是同一个缓存的句柄。锁只在同步代码里持有，从不跨越 `.await`。
#[derive(Clone)]
pub struct QueryStore {
    state: Arc<Mutex<StoreState>>,
    config: Arc<StoreConfig>,
    sweeper: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl QueryStore {
    /// 创建缓存；在 tokio 运行时内会同时启动后台清理任务
    pub fn create(config: StoreConfig) -> Self {
        let store = Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            config: Arc::new(config),
            sweeper: Arc::new(Mutex::new(None)),
        };

        if let (Some(every), Ok(handle)) = (store.config.gc_interval, Handle::try_current()) {
            let task = handle.spawn(sweep(
                Arc::downgrade(&store.state),
                every,
                store.config.gc_time,
            ));
            *lock(&store.sweeper) = Some(task);
        }

        store
    }

    /// 释放所有条目并停止后台任务，之后的读写都变成空操作
    pub fn dispose(&self) {
        {
            let mut state = lock(&self.state);
            state.disposed = true;
            state.slots.clear();
            state.in_flight.clear();
        }
        if let Some(task) = lock(&self.sweeper).take() {
            task.abort();
        }
        tracing::debug!("Query store disposed");
    }

    pub fn is_disposed(&self) -> bool {
        lock(&self.state).disposed
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// 读取条目。新鲜数据直接返回；有旧数据时返回旧数据并在后台刷新；
    /// 没有数据时等待拉取完成。同一个键同时只有一个请求。
    pub async fn get_or_create(&self, key: QueryKey, fetcher: Fetcher) -> CacheEntry {
        let pending = {
            let mut guard = lock(&self.state);
            let state = &mut *guard;
            if state.disposed {
                let mut entry = CacheEntry::empty(key);
                entry.error = Some(ServiceError::Disposed);
                return entry;
            }

            let now = Instant::now();
            let slot = state.slot_mut(&key, now);
            slot.fetcher = Some(fetcher.clone());
            if slot.entry.is_fresh(self.config.stale_time, now) {
                return slot.entry.clone();
            }

            if slot.entry.data.is_some() {
                let entry = slot.entry.clone();
                // 没有运行时就无法在后台刷新，直接返回旧数据
                if Handle::try_current().is_ok() {
                    let _ = self.start_fetch(state, &key, fetcher);
                }
                return entry;
            }
            self.start_fetch(state, &key, fetcher)
        };

        let _ = pending.await;
        self.peek(&key).unwrap_or_else(|| CacheEntry::empty(key))
    }

    /// 和 get_or_create 一样去重，但总是等待结果并把错误返回给调用方
    pub async fn fetch(&self, key: QueryKey, fetcher: Fetcher) -> FetchResult {
        let pending = {
            let mut guard = lock(&self.state);
            let state = &mut *guard;
            if state.disposed {
                return Err(ServiceError::Disposed);
            }

            let now = Instant::now();
            let slot = state.slot_mut(&key, now);
            slot.fetcher = Some(fetcher.clone());
            if slot.entry.is_fresh(self.config.stale_time, now) {
                if let Some(data) = &slot.entry.data {
                    return Ok(data.clone());
                }
            }
            self.start_fetch(state, &key, fetcher)
        };

        pending.await
    }

    /// 订阅一个键。有效订阅者存在时，失效会立即触发后台刷新。
    pub fn subscribe(&self, key: QueryKey, fetcher: Fetcher) -> Subscription {
        let (slot_id, receiver) = {
            let mut guard = lock(&self.state);
            let state = &mut *guard;
            if state.disposed {
                let (_, receiver) = watch::channel(0);
                (None, receiver)
            } else {
                let now = Instant::now();
                let slot = state.slot_mut(&key, now);
                let slot_id = slot.id;
                slot.entry.subscriber_count += 1;
                slot.inactive_since = None;
                slot.fetcher = Some(fetcher.clone());
                let receiver = slot.notify.subscribe();

                let fresh = slot.entry.is_fresh(self.config.stale_time, now);
                if !fresh && Handle::try_current().is_ok() {
                    let _ = self.start_fetch(state, &key, fetcher);
                }
                (Some(slot_id), receiver)
            }
        };

        Subscription {
            store: self.clone(),
            key,
            slot_id,
            receiver,
        }
    }

    /// 同步读取最近一次已知的状态，不等待进行中的请求
    pub fn peek(&self, key: &QueryKey) -> Option<CacheEntry> {
        lock(&self.state)
            .slots
            .get(key)
            .map(|slot| slot.entry.clone())
    }

    /// 把匹配前缀的条目标记为过期，返回条目数量。
    /// 有订阅者的条目会立即在后台重新拉取，已经在拉取的键不会重复请求。
    pub fn invalidate(&self, prefix: &KeyPrefix) -> usize {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        if state.disposed {
            return 0;
        }

        let eager = Handle::try_current().is_ok();
        let mut refetch = Vec::new();
        let mut count = 0;
        for (key, slot) in state.slots.iter_mut() {
            if !prefix.matches(key) {
                continue;
            }
            slot.mark_stale();
            count += 1;
            if eager && slot.entry.subscriber_count > 0 {
                if let Some(fetcher) = &slot.fetcher {
                    refetch.push((key.clone(), fetcher.clone()));
                }
            }
        }

        let refetched = refetch.len();
        for (key, fetcher) in refetch {
            let _ = self.start_fetch(state, &key, fetcher);
        }

        tracing::debug!(
            "Invalidated {} entries under {:?}, {} refetching",
            count,
            prefix.segments(),
            refetched
        );
        count
    }

    pub fn invalidate_all(&self) -> usize {
        self.invalidate(&KeyPrefix::all())
    }

    /// 用纯函数同步替换某个键的数据，不改变过期状态，不发请求。
    /// 返回 None 表示不修改；键不存在时会用返回值新建条目。
    pub fn set_data<F>(&self, key: &QueryKey, updater: F) -> bool
    where
        F: FnOnce(Option<&QueryData>) -> Option<QueryData>,
    {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        if state.disposed {
            return false;
        }

        if let Some(slot) = state.slots.get_mut(key) {
            return match updater(slot.entry.data.as_ref()) {
                Some(next) => {
                    slot.write(next);
                    true
                }
                None => false,
            };
        }

        match updater(None) {
            Some(next) => {
                let now = Instant::now();
                let slot = state.slot_mut(key, now);
                slot.entry.fetched_at = Some(now);
                slot.write(next);
                true
            }
            None => false,
        }
    }

    /// 对匹配前缀且已有数据的条目逐个应用 `updater`，返回实际变化的条目数
    pub fn set_queries_data<F>(&self, prefix: &KeyPrefix, mut updater: F) -> usize
    where
        F: FnMut(&QueryKey, &QueryData) -> Option<QueryData>,
    {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        if state.disposed {
            return 0;
        }

        let mut changed = 0;
        for (key, slot) in state.slots.iter_mut() {
            if !prefix.matches(key) {
                continue;
            }
            let Some(current) = slot.entry.data.as_ref() else {
                continue;
            };
            if let Some(next) = updater(key, current) {
                if &next != current {
                    slot.write(next);
                    changed += 1;
                }
            }
        }
        changed
    }

    /// 直接删除匹配前缀的条目，进行中的请求结果也不再写回。
    /// 订阅者的 `changed()` 随后返回 false。
    pub fn remove(&self, prefix: &KeyPrefix) -> usize {
        let mut state = lock(&self.state);
        state.in_flight.retain(|key, _| !prefix.matches(key));
        let before = state.slots.len();
        state.slots.retain(|key, _| !prefix.matches(key));
        before - state.slots.len()
    }

    /// 清理没有订阅者且超过保留时间的条目
    pub fn collect_garbage(&self) -> usize {
        lock(&self.state).collect(self.config.gc_time, Instant::now())
    }

    pub fn keys(&self) -> Vec<QueryKey> {
        lock(&self.state).slots.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn in_flight_count(&self) -> usize {
        lock(&self.state).in_flight.len()
    }

    fn release(&self, key: &QueryKey, slot_id: Option<u64>) {
        let mut state = lock(&self.state);
        let slot = state
            .slots
            .get_mut(key)
            .filter(|slot| Some(slot.id) == slot_id);
        if let Some(slot) = slot {
            slot.entry.subscriber_count = slot.entry.subscriber_count.saturating_sub(1);
            if slot.entry.subscriber_count == 0 {
                slot.inactive_since = Some(Instant::now());
            }
        }
    }

    fn start_fetch(
        &self,
        state: &mut StoreState,
        key: &QueryKey,
        fetcher: Fetcher,
    ) -> SharedFetch {
        spawn_fetch(&self.state, state, key, fetcher, self.config.retry.clone())
    }
}

/// 启动或加入某个键的拉取。在运行时内以独立任务执行，
/// 等待方全部放弃后请求仍会完成并写入缓存。
fn spawn_fetch(
    shared_state: &Arc<Mutex<StoreState>>,
    state: &mut StoreState,
    key: &QueryKey,
    fetcher: Fetcher,
    retry: RetryPolicy,
) -> SharedFetch {
    if let Some(pending) = state.in_flight.get(key) {
        tracing::debug!("Joining in-flight fetch for {}", key);
        return pending.fetch.clone();
    }

    let fetch_id = state.next_id();
    let slot_id = state.slots.get(key).map(|slot| slot.id);
    let job = run_fetch(
        Arc::downgrade(shared_state),
        key.clone(),
        fetcher,
        retry,
        fetch_id,
        slot_id,
    );
    let future: BoxFuture<'static, FetchResult> = match Handle::try_current() {
        Ok(handle) => {
            let task = handle.spawn(job);
            async move {
                task.await.unwrap_or_else(|err| {
                    Err(ServiceError::Transport(format!("fetch task failed: {err}")))
                })
            }
            .boxed()
        }
        Err(_) => job.boxed(),
    };

    let fetch = future.shared();
    state.in_flight.insert(
        key.clone(),
        InFlight {
            id: fetch_id,
            fetch: fetch.clone(),
        },
    );
    fetch
}

fn current_generation(state: &Weak<Mutex<StoreState>>, key: &QueryKey) -> u64 {
    let Some(state) = state.upgrade() else {
        return 0;
    };
    let guard = lock(&state);
    guard.slots.get(key).map_or(0, |slot| slot.generation)
}

async fn run_fetch(
    state: Weak<Mutex<StoreState>>,
    key: QueryKey,
    fetcher: Fetcher,
    retry: RetryPolicy,
    fetch_id: u64,
    slot_id: Option<u64>,
) -> FetchResult {
    // 请求真正发出前的失效已经包含在这次结果里
    let generation = current_generation(&state, &key);
    tracing::debug!("Fetching {}", key);
    let result = retry.run(&key, || fetcher()).await;

    if let Some(shared_state) = state.upgrade() {
        let mut guard = lock(&shared_state);
        let store = &mut *guard;
        if store.in_flight.get(&key).is_some_and(|f| f.id == fetch_id) {
            store.in_flight.remove(&key);
        }

        let mut follow_up = None;
        let slot = store
            .slots
            .get_mut(&key)
            .filter(|slot| Some(slot.id) == slot_id);
        if let Some(slot) = slot {
            match &result {
                Ok(data) => slot.resolve(data.clone(), generation, Instant::now()),
                Err(err) => slot.reject(err.clone()),
            }
            // 请求发出后又被失效，结果可能已经过时；有订阅者时再拉取一次
            if slot.generation != generation && slot.entry.subscriber_count > 0 {
                follow_up = slot.fetcher.clone();
            }
        }

        if let Some(fetcher) = follow_up {
            if Handle::try_current().is_ok() {
                tracing::debug!("Refetching {} invalidated while in flight", key);
                let _ = spawn_fetch(&shared_state, store, &key, fetcher, retry.clone());
            }
        }
    }

    result
}

async fn sweep(state: Weak<Mutex<StoreState>>, every: Duration, gc_time: Duration) {
    let mut ticker = tokio::time::interval(every);
    // 第一次 tick 立即返回
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let Some(state) = state.upgrade() else {
            break;
        };
        let removed = lock(&state).collect(gc_time, Instant::now());
        if removed > 0 {
            tracing::debug!("Garbage collected {} inactive entries", removed);
        }
    }
}

/// 某个键的订阅句柄，drop 时订阅者数量减一
pub struct Subscription {
    store: QueryStore,
    key: QueryKey,
    slot_id: Option<u64>,
    receiver: watch::Receiver<u64>,
}

impl Subscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn current(&self) -> Option<CacheEntry> {
        self.store.peek(&self.key)
    }

    /// 等待条目下一次变化；条目被删除后返回 false
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.store.release(&self.key, self.slot_id);
    }
}
