// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、抓取引擎、作业跟踪与提取策略
pub mod domain;

/// 引擎模块
///
/// 页面获取器抽象及其 HTTP 实现
pub mod engines;

/// 基础设施模块
///
/// 提供数据库、指标导出与仓库实现
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由与处理器
pub mod presentation;

/// 工具模块
///
/// 提供错误类型、重试策略与日志初始化
pub mod utils;
