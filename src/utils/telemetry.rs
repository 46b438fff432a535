// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,synchd=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// 初始化全局 tracing 订阅者
///
/// 优先读取 `RUST_LOG`，否则使用 `info,synchd=debug`。
/// 若已经安装过全局订阅者则会 panic，测试中请使用 [`try_init_telemetry`]。
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// 与 [`init_telemetry`] 相同，但重复初始化时返回 `false` 而不是 panic
pub fn try_init_telemetry() -> bool {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init()
        .is_ok()
}
