// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 按作用域键串行执行异步任务：注册表记录每个键的链尾，
/// 调度器把新任务接到链尾之后
pub mod bound;
pub mod global;
pub mod registry;
pub mod scheduler;
pub mod scope_key;
