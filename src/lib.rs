// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 按作用域键串行执行异步任务。
//!
//! 同一个键上的任务按提交顺序逐个执行，任何一个任务失败都不会阻塞或影响后续任务；
//! 不同键上的任务完全并发。
//!
//! ```no_run
//! use synchd::{synchd, ScopeKey};
//!
//! # async fn demo() {
//! let account = ScopeKey::new("account-42");
//!
//! let first = synchd(&account, || async { Ok::<_, std::io::Error>(1) });
//! let second = synchd(&account, || async { Ok::<_, std::io::Error>(2) });
//!
//! assert_eq!(first.await.unwrap(), 1);
//! assert_eq!(second.await.unwrap(), 2);
//! # }
//! ```

/// 配置模块
///
/// 处理调度器的配置设置和环境变量
pub mod config;

/// 基础设施模块
///
/// 提供指标集成
pub mod infrastructure;

/// 队列模块
///
/// 实现按键串行的任务调度
pub mod queue;

/// 工具模块
///
/// 提供错误类型和日志初始化
pub mod utils;

pub use crate::config::settings::SynchdSettings;
pub use crate::queue::bound::BoundTask;
pub use crate::queue::global::{default_synchd, synchd, synchd_fn};
pub use crate::queue::registry::{ChainTail, KeyRegistry};
pub use crate::queue::scheduler::{Outcome, Synchd};
pub use crate::queue::scope_key::{ByIdentity, ScopeKey};
pub use crate::utils::errors::SynchdError;
