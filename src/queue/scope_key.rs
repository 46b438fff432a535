// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 按身份比较的作用域键
///
/// 两个 `ScopeKey` 只有在由同一次 [`ScopeKey::new`] 克隆而来时才相等，
/// 标签相同并不代表是同一个键。
#[derive(Clone)]
pub struct ScopeKey {
    inner: Arc<str>,
}

impl ScopeKey {
    /// 创建一个新的、与其他所有键都不相等的键
    ///
    /// # 参数
    ///
    /// * `label` - 仅用于日志和调试输出的名称
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self {
            inner: label.into(),
        }
    }

    /// 匿名键
    pub fn anonymous() -> Self {
        Self::new("anonymous")
    }

    /// 键的标签
    pub fn label(&self) -> &str {
        &self.inner
    }

    fn addr(&self) -> *const u8 {
        Arc::as_ptr(&self.inner) as *const u8
    }
}

impl PartialEq for ScopeKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ScopeKey {}

impl Hash for ScopeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScopeKey")
            .field(&self.label())
            .field(&self.addr())
            .finish()
    }
}

/// 以 `Arc` 指向的对象身份作为键
///
/// 适用于已经用 `Arc` 共享的资源对象：同一个分配上的所有克隆互相相等，
/// 内容相同但分配不同的对象互不相等。
pub struct ByIdentity<T: ?Sized>(pub Arc<T>);

impl<T: ?Sized> ByIdentity<T> {
    pub fn of(value: &Arc<T>) -> Self {
        Self(Arc::clone(value))
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl<T: ?Sized> Clone for ByIdentity<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> PartialEq for ByIdentity<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl<T: ?Sized> Eq for ByIdentity<T> {}

impl<T: ?Sized> Hash for ByIdentity<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for ByIdentity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByIdentity").field(&self.addr()).finish()
    }
}
