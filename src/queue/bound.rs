// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::scheduler::{Outcome, Synchd};
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

/// 绑定了作用域键的任务工厂
///
/// 每次 [`BoundTask::call`] 都用本次的参数构造一个新任务并提交到同一个键，
/// 所以通过同一个 `BoundTask`（及其克隆）发起的调用彼此串行。
/// 多个参数以元组形式传入。
pub struct BoundTask<K, F> {
    synchd: Synchd<K>,
    key: K,
    factory: Arc<F>,
}

impl<K, F> BoundTask<K, F> {
    pub(crate) fn new(synchd: Synchd<K>, key: K, factory: F) -> Self {
        Self {
            synchd,
            key,
            factory: Arc::new(factory),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K, F> BoundTask<K, F>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// 以给定参数提交一次任务
    ///
    /// # 参数
    ///
    /// * `args` - 本次调用的参数，只属于这一次调用
    ///
    /// # 返回值
    ///
    /// 这一次调用自己的结果句柄
    pub fn call<A, Fut, R>(&self, args: A) -> Outcome<R>
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        A: Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        let factory = Arc::clone(&self.factory);
        self.synchd.submit(self.key.clone(), move || (*factory)(args))
    }

    /// 转换为普通闭包
    pub fn into_fn<A, Fut, R>(self) -> impl Fn(A) -> Outcome<R>
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        A: Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        move |args| self.call(args)
    }
}

impl<K: Clone, F> Clone for BoundTask<K, F> {
    fn clone(&self) -> Self {
        Self {
            synchd: self.synchd.clone(),
            key: self.key.clone(),
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<K: fmt::Debug, F> fmt::Debug for BoundTask<K, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundTask").field("key", &self.key).finish()
    }
}
