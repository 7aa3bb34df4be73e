// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 提取（extraction）：三层策略链，从页面提取线索
/// - 作业跟踪器（job_tracker）：活跃作业表、进度与暂停/取消信号
/// - 抓取引擎（scrape_engine）：单次抓取运行的完整状态机
pub mod extraction;
pub mod job_tracker;
pub mod scrape_engine;
