// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::SynchdSettings;
use crate::infrastructure::metrics;
use crate::queue::bound::BoundTask;
use crate::queue::registry::{ChainTail, KeyRegistry, TailSignal};
use crate::utils::errors::SynchdError;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// 按键串行的任务调度器
///
/// 同一个键上提交的任务严格按提交顺序逐个执行，前一个任务结束（无论成功还是失败）
/// 之后下一个才会开始；不同键上的任务互不影响。
///
/// `Synchd` 的克隆共享同一个注册表。
pub struct Synchd<K> {
    registry: Arc<KeyRegistry<K>>,
    settings: Arc<SynchdSettings>,
    handle: Option<Handle>,
}

impl<K> Clone for Synchd<K> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            settings: Arc::clone(&self.settings),
            handle: self.handle.clone(),
        }
    }
}

impl<K> fmt::Debug for Synchd<K>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchd")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .finish()
    }
}

impl<K> Synchd<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// 在当前 tokio 运行时上创建调度器
    ///
    /// # Panics
    ///
    /// 不在 tokio 运行时中调用时 panic，见 [`Synchd::try_new`]
    pub fn new() -> Self {
        Self::with_handle(Handle::current())
    }

    /// 在当前 tokio 运行时上创建调度器
    ///
    /// # Returns
    ///
    /// * `Ok(Synchd)` - 绑定到当前运行时的调度器
    /// * `Err(SynchdError::NoRuntime)` - 当前线程没有运行时
    pub fn try_new() -> Result<Self, SynchdError> {
        Ok(Self::with_handle(Handle::try_current()?))
    }

    /// 在当前 tokio 运行时上创建调度器，并从配置文件和环境变量加载配置
    ///
    /// # Returns
    ///
    /// * `Ok(Synchd)` - 使用 [`SynchdSettings::new`] 加载的配置
    /// * `Err(SynchdError)` - 没有运行时或配置加载失败
    pub fn from_env() -> Result<Self, SynchdError> {
        let settings = SynchdSettings::new()?;
        Ok(Self::try_new()?.with_settings(settings))
    }

    /// 使用指定的运行时句柄创建调度器，之后可以在任意线程上提交任务
    pub fn with_handle(handle: Handle) -> Self {
        metrics::describe_metrics();
        Self {
            registry: Arc::new(KeyRegistry::new()),
            settings: Arc::new(SynchdSettings::default()),
            handle: Some(handle),
        }
    }

    /// 创建不绑定运行时的调度器
    ///
    /// 任务在提交时通过 `tokio::spawn` 派发到调用方所在的运行时，
    /// 因此 [`Synchd::submit`] 必须在运行时中调用。
    pub fn detached() -> Self {
        metrics::describe_metrics();
        Self {
            registry: Arc::new(KeyRegistry::new()),
            settings: Arc::new(SynchdSettings::default()),
            handle: None,
        }
    }

    /// 替换配置
    pub fn with_settings(mut self, settings: SynchdSettings) -> Self {
        self.settings = Arc::new(settings);
        self
    }

    pub fn settings(&self) -> &SynchdSettings {
        &self.settings
    }

    pub fn registry(&self) -> &KeyRegistry<K> {
        &self.registry
    }

    /// 键上已提交但尚未结束的任务数
    pub fn pending(&self, key: &K) -> usize {
        self.registry.pending(key)
    }

    /// 键上是否没有在途任务
    pub fn is_idle(&self, key: &K) -> bool {
        !self.registry.contains(key)
    }

    /// 有在途任务的键的数量
    pub fn active_keys(&self) -> usize {
        self.registry.len()
    }

    /// 在键上提交一个任务
    ///
    /// 该调用是同步且非阻塞的：它只把任务挂到键的链尾上并立即返回。
    /// 返回之前新的链尾已经写入注册表，所以紧接着的提交（包括任务体内部的重入提交）
    /// 一定排在这个任务之后。
    ///
    /// 前一个任务的失败只影响时机，不会传给这个任务；这个任务自己的结果
    /// （包括 `Err`）原样通过返回的 [`Outcome`] 交给调用方。
    ///
    /// # 参数
    ///
    /// * `key` - 作用域键
    /// * `task` - 轮到它时才会被调用、且只调用一次的任务
    ///
    /// # Panics
    ///
    /// 通过 [`Synchd::detached`] 创建且不在运行时中调用时 panic
    pub fn submit<F, Fut, R>(&self, key: K, task: F) -> Outcome<R>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        let (tail, signal) = ChainTail::pending();
        let (previous, pending) = self.registry.store(key.clone(), tail);

        let metrics_enabled = self.settings.metrics_enabled;
        if metrics_enabled {
            metrics::record_submitted();
            metrics::record_active_keys(self.registry.len());
        }
        if self.settings.should_warn_backlog(pending) {
            warn!(pending, "Scope key backlog keeps growing");
        }
        trace!(pending, chained = previous.is_some(), "Task queued");

        let guard = SettleGuard {
            registry: Arc::clone(&self.registry),
            key: Some(key),
            signal: Some(signal),
            metrics_enabled,
        };

        let operation = async move {
            let guard = guard;
            if let Some(previous) = previous {
                previous.settled().await;
            }
            let output = task().await;
            drop(guard);
            output
        };

        let join = match &self.handle {
            Some(handle) => handle.spawn(operation),
            None => tokio::spawn(operation),
        };
        Outcome { join }
    }

    /// 把键和任务工厂绑定成一个可重复调用的 [`BoundTask`]
    pub fn bind<F>(&self, key: K, factory: F) -> BoundTask<K, F> {
        BoundTask::new(self.clone(), key, factory)
    }
}

/// 等同于 [`Synchd::detached`]
impl<K> Default for Synchd<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::detached()
    }
}

/// 在操作结束时（正常返回、panic 或被运行时丢弃）释放注册表条目并完成链尾
struct SettleGuard<K>
where
    K: Eq + Hash + Clone,
{
    registry: Arc<KeyRegistry<K>>,
    key: Option<K>,
    signal: Option<TailSignal>,
    metrics_enabled: bool,
}

impl<K> Drop for SettleGuard<K>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        let panicked = std::thread::panicking();
        if let Some(key) = self.key.take() {
            let drained = self.registry.settle(&key);
            trace!(drained, panicked, "Task settled");
        }
        if self.metrics_enabled {
            metrics::record_settled(panicked);
            metrics::record_active_keys(self.registry.len());
        }
        // The successor may start only after the registry is up to date.
        if let Some(signal) = self.signal.take() {
            signal.settle();
        }
    }
}

/// 单次提交的结果句柄
///
/// await 得到任务自己的输出。任务 panic 时，panic 会在 await 处原样恢复；
/// 不希望展开时使用 [`Outcome::try_join`]。丢弃句柄不会取消任务。
#[must_use = "dropping an Outcome detaches the task; its failure will go unobserved"]
pub struct Outcome<R> {
    join: JoinHandle<R>,
}

impl<R> Outcome<R> {
    /// 等待任务结束，把 panic 和取消转换为 [`SynchdError`]
    pub async fn try_join(self) -> Result<R, SynchdError> {
        self.join.await.map_err(|err| {
            if err.is_panic() {
                SynchdError::from_panic(err.into_panic())
            } else {
                SynchdError::Cancelled
            }
        })
    }

    /// 任务是否已经结束
    pub fn is_settled(&self) -> bool {
        self.join.is_finished()
    }
}

impl<R> Future for Outcome<R> {
    type Output = R;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<R> {
        match futures::ready!(Pin::new(&mut self.join).poll(cx)) {
            Ok(output) => Poll::Ready(output),
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => panic!("synchd task was cancelled before it settled"),
        }
    }
}

impl<R> fmt::Debug for Outcome<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("settled", &self.is_settled())
            .finish()
    }
}
