// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{JobStatus, JobUpdate};
use crate::domain::repositories::job_repository::JobRepository;
use crate::utils::errors::ScrapeError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use metrics::gauge;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// 活跃作业条目
struct ActiveJob {
    /// 作业ID，作业记录创建前为空
    job_id: Option<i32>,
    /// 进度 0-100
    progress: u8,
    /// 状态镜像，兼作取消信号
    status: watch::Sender<JobStatus>,
}

/// 活跃作业快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveJobSnapshot {
    pub source_id: i32,
    pub job_id: i32,
    pub progress: u8,
    pub status: JobStatus,
}

/// 作业控制句柄
///
/// 由 [`JobTracker::reserve`] 返回，运行中的作业通过它观察暂停与取消。
#[derive(Debug)]
pub struct JobControl {
    source_id: i32,
    job_id: Option<i32>,
    status: watch::Receiver<JobStatus>,
}

impl JobControl {
    pub fn source_id(&self) -> i32 {
        self.source_id
    }

    pub fn job_id(&self) -> Option<i32> {
        self.job_id
    }

    /// 当前状态
    pub fn status(&self) -> JobStatus {
        *self.status.borrow()
    }

    /// 取消信号是否已触发
    pub fn is_cancelled(&self) -> bool {
        self.status() == JobStatus::Cancelled
    }

    /// 条目是否已从跟踪器移除
    pub fn is_detached(&self) -> bool {
        self.status.has_changed().is_err()
    }

    /// 等待状态变化，最多等待 `timeout`
    ///
    /// # 返回值
    ///
    /// 状态发生变化时返回true；超时或条目已被移除时返回false
    pub async fn wait_for_change(&mut self, timeout: Duration) -> bool {
        matches!(
            tokio::time::timeout(timeout, self.status.changed()).await,
            Ok(Ok(()))
        )
    }
}

/// 作业跟踪器
///
/// 内存中的活跃作业表，按抓取源ID索引。每个抓取源同一时间最多一个
/// 活跃作业；登记通过 DashMap 的 entry API 原子完成。
/// 除暂停/恢复/取消的状态持久化外，所有副作用都局限于内存表。
pub struct JobTracker {
    active: DashMap<i32, ActiveJob>,
    jobs: Arc<dyn JobRepository>,
}

impl JobTracker {
    pub fn new(jobs: Arc<dyn JobRepository>) -> Self {
        Self {
            active: DashMap::new(),
            jobs,
        }
    }

    /// 原子地检查并登记抓取源
    ///
    /// # 返回值
    ///
    /// * `Ok(JobControl)` - 登记成功
    /// * `Err(ScrapeError::Concurrency)` - 该抓取源已有活跃作业
    pub fn reserve(&self, source_id: i32) -> Result<JobControl, ScrapeError> {
        let control = match self.active.entry(source_id) {
            Entry::Occupied(_) => return Err(ScrapeError::Concurrency { source_id }),
            Entry::Vacant(slot) => {
                let (tx, rx) = watch::channel(JobStatus::Running);
                slot.insert(ActiveJob {
                    job_id: None,
                    progress: 0,
                    status: tx,
                });
                JobControl {
                    source_id,
                    job_id: None,
                    status: rx,
                }
            }
        };
        self.record_active();
        Ok(control)
    }

    /// 将作业记录绑定到已登记的抓取源
    pub fn bind(&self, control: &mut JobControl, job_id: i32) {
        if let Some(mut entry) = self.active.get_mut(&control.source_id) {
            entry.job_id = Some(job_id);
            entry.progress = 0;
        }
        control.job_id = Some(job_id);
    }

    /// 释放尚未绑定作业的登记（作业记录创建失败时使用）
    pub fn release(&self, control: &JobControl) {
        self.active
            .remove_if(&control.source_id, |_, entry| entry.job_id.is_none());
        self.record_active();
    }

    /// 作业结束后注销
    ///
    /// 只移除仍属于该作业的条目，不会误删同一抓取源后续登记的作业。
    pub fn finish(&self, control: &JobControl) {
        self.active
            .remove_if(&control.source_id, |_, entry| entry.job_id == control.job_id);
        self.record_active();
    }

    /// 抓取源是否有运行中或暂停中的作业
    pub fn is_running(&self, source_id: i32) -> bool {
        self.active
            .get(&source_id)
            .is_some_and(|entry| entry.status.borrow().is_active())
    }

    /// 列出所有已绑定作业的快照
    pub fn list_active(&self) -> Vec<ActiveJobSnapshot> {
        let mut jobs: Vec<_> = self
            .active
            .iter()
            .filter_map(|entry| {
                entry.job_id.map(|job_id| ActiveJobSnapshot {
                    source_id: *entry.key(),
                    job_id,
                    progress: entry.progress,
                    status: *entry.status.borrow(),
                })
            })
            .collect();
        jobs.sort_by_key(|j| j.job_id);
        jobs
    }

    /// 作业当前的内存状态
    pub fn status_of(&self, job_id: i32) -> Option<JobStatus> {
        self.active
            .iter()
            .find(|entry| entry.job_id == Some(job_id))
            .map(|entry| *entry.status.borrow())
    }

    /// 作业当前进度
    pub fn progress_of(&self, job_id: i32) -> Option<u8> {
        self.active
            .iter()
            .find(|entry| entry.job_id == Some(job_id))
            .map(|entry| entry.progress)
    }

    /// 更新进度
    ///
    /// 限制在 0-100 并保持单调不减；条目不存在时忽略。
    pub fn set_progress(&self, job_id: i32, percent: u8) {
        if let Some(mut entry) = self
            .active
            .iter_mut()
            .find(|entry| entry.job_id == Some(job_id))
        {
            entry.progress = entry.progress.max(percent.min(100));
        }
    }

    /// 暂停运行中的作业
    ///
    /// # 返回值
    ///
    /// 作业存在且处于运行状态时返回true
    pub async fn pause(&self, job_id: i32) -> bool {
        self.transition(job_id, JobStatus::Running, JobStatus::Paused)
            .await
    }

    /// 恢复已暂停的作业
    pub async fn resume(&self, job_id: i32) -> bool {
        self.transition(job_id, JobStatus::Paused, JobStatus::Running)
            .await
    }

    /// 取消作业
    ///
    /// 触发取消信号，持久化 `cancelled` 与结束时间，并移除条目。
    pub async fn cancel(&self, job_id: i32) -> bool {
        let Some(source_id) = self.source_of(job_id) else {
            return false;
        };
        let Some((_, entry)) = self
            .active
            .remove_if(&source_id, |_, entry| entry.job_id == Some(job_id))
        else {
            return false;
        };

        entry.status.send_replace(JobStatus::Cancelled);
        drop(entry);
        self.record_active();
        info!(job_id, source_id, "Job cancelled");

        if let Err(e) = self.jobs.update(job_id, &JobUpdate::cancelled()).await {
            warn!(job_id, error = %e, "Failed to persist job cancellation");
        }
        true
    }

    async fn transition(&self, job_id: i32, from: JobStatus, to: JobStatus) -> bool {
        // The map guard is released before persisting
        let changed = match self
            .active
            .iter()
            .find(|entry| entry.job_id == Some(job_id))
        {
            Some(entry) => entry.status.send_if_modified(|status| {
                if *status == from {
                    *status = to;
                    true
                } else {
                    false
                }
            }),
            None => false,
        };

        if !changed {
            return false;
        }

        debug!(job_id, %from, %to, "Job status changed");
        if let Err(e) = self.jobs.update(job_id, &JobUpdate::status(to)).await {
            warn!(job_id, error = %e, "Failed to persist job status {}", to);
        }
        true
    }

    fn source_of(&self, job_id: i32) -> Option<i32> {
        self.active
            .iter()
            .find(|entry| entry.job_id == Some(job_id))
            .map(|entry| *entry.key())
    }

    fn record_active(&self) {
        gauge!("leadrs_active_jobs").set(self.active.len() as f64);
    }
}
