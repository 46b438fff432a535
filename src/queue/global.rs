// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::SynchdSettings;
use crate::queue::bound::BoundTask;
use crate::queue::scheduler::{Outcome, Synchd};
use crate::queue::scope_key::ScopeKey;
use once_cell::sync::Lazy;
use std::future::Future;
use tracing::warn;

static DEFAULT_SYNCHD: Lazy<Synchd<ScopeKey>> = Lazy::new(|| {
    let settings = SynchdSettings::new().unwrap_or_else(|e| {
        warn!("Failed to load synchd settings, using defaults: {}", e);
        SynchdSettings::default()
    });
    Synchd::detached().with_settings(settings)
});

/// 进程级默认调度器
///
/// 任务派发到调用方所在的 tokio 运行时。
pub fn default_synchd() -> &'static Synchd<ScopeKey> {
    &DEFAULT_SYNCHD
}

/// 在默认调度器上按 `key` 提交任务，见 [`Synchd::submit`]
///
/// # Panics
///
/// 不在 tokio 运行时中调用时 panic
pub fn synchd<F, Fut, R>(key: &ScopeKey, task: F) -> Outcome<R>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Send + 'static,
{
    DEFAULT_SYNCHD.submit(key.clone(), task)
}

/// 在默认调度器上绑定键和任务工厂，见 [`Synchd::bind`]
pub fn synchd_fn<F>(key: ScopeKey, factory: F) -> BoundTask<ScopeKey, F> {
    DEFAULT_SYNCHD.bind(key, factory)
}
