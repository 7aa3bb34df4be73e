// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::sqlite_db;
use leadrs::domain::models::job::{DomainError, JobStatus, JobUpdate};
use leadrs::domain::models::source::NewSource;
use leadrs::domain::repositories::{
    job_repository::JobRepository, source_repository::SourceRepository,
};
use leadrs::infrastructure::repositories::{
    job_repo_impl::JobRepositoryImpl, source_repo_impl::SourceRepositoryImpl,
};
use leadrs::utils::errors::RepositoryError;
use serde_json::json;

async fn repos() -> (JobRepositoryImpl, i32) {
    let db = sqlite_db().await;
    let sources = SourceRepositoryImpl::new(db.clone());
    let source = sources
        .create(&NewSource::new("Office moves", "https://offices.example.com", json!(null)))
        .await
        .unwrap();
    (JobRepositoryImpl::new(db), source.id)
}

/// 作业以运行状态创建，完成时写入结束时间与计数
#[tokio::test]
async fn test_job_lifecycle_round_trip() {
    let (jobs, source_id) = repos().await;

    let job = jobs.create(source_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Running);
    assert_eq!(job.source_id, source_id);
    assert!(job.end_time.is_none());

    let paused = jobs
        .update(job.id, &JobUpdate::status(JobStatus::Paused))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(paused.status, JobStatus::Paused);

    jobs.update(job.id, &JobUpdate::status(JobStatus::Running))
        .await
        .unwrap();
    let completed = jobs
        .update(job.id, &JobUpdate::completed(3, 2))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(completed.status, JobStatus::Completed);
    assert_eq!(completed.leads_found, Some(3));
    assert_eq!(completed.leads_added, Some(2));
    assert!(completed.end_time.unwrap() >= completed.start_time);

    let stored = jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(stored.leads_added, Some(2));
}

/// 终态作业拒绝状态更新；已取消作业允许补写计数
#[tokio::test]
async fn test_terminal_jobs_are_protected() {
    let (jobs, source_id) = repos().await;
    let job = jobs.create(source_id).await.unwrap();

    jobs.update(job.id, &JobUpdate::cancelled()).await.unwrap();

    let rejected = jobs.update(job.id, &JobUpdate::completed(5, 5)).await;
    assert!(matches!(
        rejected,
        Err(RepositoryError::Domain(DomainError::AlreadyTerminal(
            JobStatus::Cancelled
        )))
    ));

    let counted = jobs
        .update(job.id, &JobUpdate::counts(5, 2))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(counted.status, JobStatus::Cancelled);
    assert_eq!(counted.leads_found, Some(5));
    assert_eq!(counted.leads_added, Some(2));
}

#[tokio::test]
async fn test_update_missing_job_returns_none() {
    let (jobs, _) = repos().await;

    assert!(jobs
        .update(404, &JobUpdate::failed("boom"))
        .await
        .unwrap()
        .is_none());
    assert!(jobs.find_by_id(404).await.unwrap().is_none());
}
