// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 抓取作业（job）：一次抓取执行及其生命周期
/// - 线索（lead）：提取出的企业线索记录
/// - 选择器配置（selector_config）：抓取源的提取规则
/// - 抓取源（source）：待抓取的网站
pub mod job;
pub mod lead;
pub mod selector_config;
pub mod source;
