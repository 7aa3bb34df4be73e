// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 作业仓库（job_repository）：管理抓取作业的生命周期记录
/// - 线索仓库（lead_repository）：管理抓取到的线索
/// - 抓取源仓库（source_repository）：管理抓取源及其提取规则
pub mod job_repository;
pub mod lead_repository;
pub mod source_repository;
