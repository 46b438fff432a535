// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

pub const TASKS_SUBMITTED: &str = "synchd_tasks_submitted_total";
pub const TASKS_SETTLED: &str = "synchd_tasks_settled_total";
pub const TASKS_PANICKED: &str = "synchd_tasks_panicked_total";
pub const ACTIVE_KEYS: &str = "synchd_active_keys";

static DESCRIBED: OnceCell<()> = OnceCell::new();

/// 注册指标描述
///
/// 库本身不安装任何 exporter，由宿主程序决定指标的去向。可以多次调用。
pub fn describe_metrics() {
    DESCRIBED.get_or_init(|| {
        describe_counter!(TASKS_SUBMITTED, "Total number of tasks submitted to a scope key");
        describe_counter!(TASKS_SETTLED, "Total number of tasks that settled");
        describe_counter!(TASKS_PANICKED, "Total number of tasks that panicked");
        describe_gauge!(ACTIVE_KEYS, "Number of scope keys with in-flight work");
    });
}

pub(crate) fn record_submitted() {
    counter!(TASKS_SUBMITTED).increment(1);
}

pub(crate) fn record_settled(panicked: bool) {
    counter!(TASKS_SETTLED).increment(1);
    if panicked {
        counter!(TASKS_PANICKED).increment(1);
    }
}

pub(crate) fn record_active_keys(count: usize) {
    gauge!(ACTIVE_KEYS).set(count as f64);
}
