// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::any::Any;
use thiserror::Error;

/// 调度器自身的错误类型
///
/// 任务本身的失败永远不会被包装进这个类型，它们原样返回给提交者。
#[derive(Error, Debug)]
pub enum SynchdError {
    #[error("当前线程不在 tokio 运行时中: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("任务发生 panic: {0}")]
    Panicked(String),

    #[error("任务在完成前被运行时取消")]
    Cancelled,
}

impl SynchdError {
    /// 从 panic 负载中提取可读的消息
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "<non-string panic payload>".to_string()
        };
        SynchdError::Panicked(message)
    }
}
