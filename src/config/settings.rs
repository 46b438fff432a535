// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 默认的积压告警阈值
pub const DEFAULT_BACKLOG_WARN_THRESHOLD: usize = 1024;

/// 调度器配置设置
///
/// 这些设置只影响可观测性，不会改变任何键的排队语义。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SynchdSettings {
    /// 单个键积压的任务数每达到该值的整数倍时输出一次告警，0 表示关闭
    pub backlog_warn_threshold: usize,
    /// 是否记录 metrics 指标
    pub metrics_enabled: bool,
}

impl Default for SynchdSettings {
    fn default() -> Self {
        Self {
            backlog_warn_threshold: DEFAULT_BACKLOG_WARN_THRESHOLD,
            metrics_enabled: true,
        }
    }
}

impl SynchdSettings {
    /// 创建新的配置实例
    ///
    /// 依次读取默认值、`config/synchd`、`config/synchd.{APP_ENVIRONMENT}`
    /// 以及 `SYNCHD__` 前缀的环境变量，后者覆盖前者
    ///
    /// # Returns
    ///
    /// * `Ok(SynchdSettings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("config/synchd").required(false))
                .add_source(File::with_name(&format!("config/synchd.{}", env)).required(false))
                .add_source(
                    Environment::with_prefix("SYNCHD")
                        .prefix_separator("__")
                        .try_parsing(true),
                ),
        )
    }

    /// 只从给定的配置源加载，未提供的字段使用默认值
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        builder
            .set_default(
                "backlog_warn_threshold",
                defaults.backlog_warn_threshold as u64,
            )?
            .set_default("metrics_enabled", defaults.metrics_enabled)?
            .build()?
            .try_deserialize()
    }

    /// 判断某个积压深度是否需要告警
    pub fn should_warn_backlog(&self, pending: usize) -> bool {
        self.backlog_warn_threshold > 0
            && pending > 0
            && pending % self.backlog_warn_threshold == 0
    }
}
