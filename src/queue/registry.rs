// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::fmt;
use std::hash::Hash;
use tokio::sync::oneshot;

/// 链尾句柄
///
/// 代表某个键最近一次提交的操作“已结束”（无论成功、失败还是 panic）。
/// 句柄本身只传递时机，不传递结果。
#[derive(Clone)]
pub struct ChainTail {
    settled: Shared<BoxFuture<'static, ()>>,
}

/// 链尾的完成端，丢弃或调用 [`TailSignal::settle`] 都会让链尾完成
pub struct TailSignal {
    tx: oneshot::Sender<()>,
}

impl ChainTail {
    /// 创建一个尚未完成的链尾以及对应的完成端
    pub fn pending() -> (Self, TailSignal) {
        let (tx, rx) = oneshot::channel();
        // A dropped sender counts as settled too.
        let settled = rx.map(|_| ()).boxed().shared();
        (Self { settled }, TailSignal { tx })
    }

    /// 等待链尾完成
    pub async fn settled(self) {
        self.settled.await
    }

    /// 链尾是否已经完成（仅在某个等待者观察到完成之后才为 `true`）
    pub fn is_settled(&self) -> bool {
        self.settled.peek().is_some()
    }

    /// 两个句柄是否指向同一次提交
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Shared::ptr_eq(&self.settled, &other.settled)
    }
}

impl fmt::Debug for ChainTail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainTail")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl TailSignal {
    pub fn settle(self) {
        let _ = self.tx.send(());
    }
}

#[derive(Debug)]
struct RegistryEntry {
    tail: ChainTail,
    pending: usize,
}

/// 键注册表
///
/// 保存每个有在途任务的键的链尾。条目在首次提交时创建，
/// 在该键的所有任务结束后删除，因此大小只取决于当前活跃的键数量。
pub struct KeyRegistry<K> {
    entries: DashMap<K, RegistryEntry>,
}

impl<K> Default for KeyRegistry<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> KeyRegistry<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// 查找键当前的链尾
    ///
    /// # 返回值
    ///
    /// 没有在途任务时返回 `None`
    pub fn lookup(&self, key: &K) -> Option<ChainTail> {
        self.entries.get(key).map(|entry| entry.tail.clone())
    }

    /// 用新的链尾覆盖（或创建）键的条目
    ///
    /// 读取旧链尾和写入新链尾在同一个分片锁内完成，
    /// 并发提交不会拿到同一个前驱。
    ///
    /// # 参数
    ///
    /// * `key` - 作用域键
    /// * `tail` - 最新提交的操作的链尾
    ///
    /// # 返回值
    ///
    /// 被替换的链尾，以及写入后该键的在途任务数
    pub fn store(&self, key: K, tail: ChainTail) -> (Option<ChainTail>, usize) {
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                let previous = std::mem::replace(&mut entry.tail, tail);
                entry.pending += 1;
                (Some(previous), entry.pending)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(RegistryEntry { tail, pending: 1 });
                (None, 1)
            }
        }
    }

    /// 记录键的一个操作已经结束
    ///
    /// 在途任务数归零时删除条目。
    ///
    /// # 返回值
    ///
    /// 条目是否被删除
    pub fn settle(&self, key: &K) -> bool {
        // `entry` needs an owned key; `get_mut` followed by `remove_if` keeps the
        // decrement and the removal check under the shard lock of each call.
        let drained = match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.pending = entry.pending.saturating_sub(1);
                entry.pending == 0
            }
            None => false,
        };

        drained && self.entries.remove_if(key, |_, entry| entry.pending == 0).is_some()
    }

    /// 键当前的在途任务数
    pub fn pending(&self, key: &K) -> usize {
        self.entries.get(key).map(|entry| entry.pending).unwrap_or(0)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// 有在途任务的键的数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K> fmt::Debug for KeyRegistry<K>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRegistry")
            .field("active_keys", &self.entries.len())
            .finish()
    }
}
