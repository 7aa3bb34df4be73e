// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 抓取作业实体
///
/// 表示对某个抓取源的一次执行尝试。作业以 `Running` 状态创建，
/// 在整个运行过程中由引擎和外部的暂停/恢复/取消请求修改，
/// 最终进入终态（Completed/Failed/Cancelled）且只进入一次。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapingJob {
    /// 作业ID
    pub id: i32,
    /// 所属抓取源ID
    pub source_id: i32,
    /// 作业状态
    pub status: JobStatus,
    /// 开始时间
    pub start_time: DateTime<Utc>,
    /// 结束时间，仅在终态时设置
    pub end_time: Option<DateTime<Utc>>,
    /// 提取到的线索数量
    pub leads_found: Option<i32>,
    /// 成功入库的线索数量
    pub leads_added: Option<i32>,
    /// 失败原因
    pub error: Option<String>,
}

/// 作业状态枚举
///
/// 状态转换遵循以下流程：
/// Running ⇄ Paused → Completed/Failed/Cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 运行中
    #[default]
    Running,
    /// 已暂停（瞬态，不会作为最终状态）
    Paused,
    /// 已完成
    Completed,
    /// 已失败
    Failed,
    /// 已取消
    Cancelled,
}

impl JobStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// 是否为活跃状态（运行中或已暂停）
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Running | JobStatus::Paused)
    }

    /// 判断状态转换是否合法
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match (self, next) {
            (JobStatus::Running, JobStatus::Running) => false,
            (JobStatus::Running, _) => true,
            (JobStatus::Paused, JobStatus::Paused) => false,
            (JobStatus::Paused, _) => true,
            _ => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Running => write!(f, "running"),
            JobStatus::Paused => write!(f, "paused"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(JobStatus::Running),
            "paused" => Ok(JobStatus::Paused),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            "cancelled" => Ok(JobStatus::Cancelled),
            _ => Err(()),
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 无效的状态转换
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: JobStatus, to: JobStatus },

    /// 作业已处于终态，不允许再修改
    #[error("Job is already {0}")]
    AlreadyTerminal(JobStatus),

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// 作业局部更新
///
/// 对应存储层的 `updateJob(id, partial)`，未设置的字段保持不变。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub end_time: Option<DateTime<Utc>>,
    pub leads_found: Option<i32>,
    pub leads_added: Option<i32>,
    pub error: Option<String>,
}

impl JobUpdate {
    /// 仅变更状态
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// 标记完成并记录计数
    pub fn completed(leads_found: i32, leads_added: i32) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            end_time: Some(Utc::now()),
            leads_found: Some(leads_found),
            leads_added: Some(leads_added),
            error: None,
        }
    }

    /// 标记失败并记录错误信息
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            end_time: Some(Utc::now()),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// 标记取消
    pub fn cancelled() -> Self {
        Self {
            status: Some(JobStatus::Cancelled),
            end_time: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// 仅记录计数
    pub fn counts(leads_found: i32, leads_added: i32) -> Self {
        Self {
            leads_found: Some(leads_found),
            leads_added: Some(leads_added),
            ..Default::default()
        }
    }

    /// 附加计数
    pub fn with_counts(mut self, leads_found: i32, leads_added: i32) -> Self {
        self.leads_found = Some(leads_found);
        self.leads_added = Some(leads_added);
        self
    }
}

impl ScrapingJob {
    /// 创建一个新的运行中作业
    ///
    /// # 参数
    ///
    /// * `id` - 作业ID（由存储层分配）
    /// * `source_id` - 抓取源ID
    pub fn new(id: i32, source_id: i32) -> Self {
        Self {
            id,
            source_id,
            status: JobStatus::Running,
            start_time: Utc::now(),
            end_time: None,
            leads_found: None,
            leads_added: None,
            error: None,
        }
    }

    /// 应用局部更新
    ///
    /// 终态作业的状态不可再变更；已取消的作业仍允许补写计数，
    /// 以便引擎记录取消时已经达到的进度。
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 更新成功
    /// * `Err(DomainError)` - 违反状态机或计数不变量
    pub fn apply(&mut self, update: &JobUpdate) -> Result<(), DomainError> {
        let writes_counts = update.leads_found.is_some() || update.leads_added.is_some();

        if self.status.is_terminal() {
            if update.status.is_some() || update.error.is_some() {
                return Err(DomainError::AlreadyTerminal(self.status));
            }
            if writes_counts && self.status != JobStatus::Cancelled {
                return Err(DomainError::AlreadyTerminal(self.status));
            }
        }

        let mut next = self.clone();

        if let Some(status) = update.status {
            if !self.status.can_transition_to(status) {
                return Err(DomainError::InvalidStateTransition {
                    from: self.status,
                    to: status,
                });
            }
            next.status = status;
            if status.is_terminal() {
                // end_time never precedes start_time
                let end = update.end_time.unwrap_or_else(Utc::now);
                next.end_time = Some(end.max(self.start_time));
            }
        }

        if let Some(found) = update.leads_found {
            next.leads_found = Some(found);
        }
        if let Some(added) = update.leads_added {
            next.leads_added = Some(added);
        }
        if let Some(error) = &update.error {
            next.error = Some(error.clone());
        }

        if let (Some(found), Some(added)) = (next.leads_found, next.leads_added) {
            if found < 0 || added < 0 || added > found {
                return Err(DomainError::ValidationError(format!(
                    "leads_added ({}) must be between 0 and leads_found ({})",
                    added, found
                )));
            }
        }

        *self = next;
        Ok(())
    }
}
