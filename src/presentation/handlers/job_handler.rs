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

use axum::{
    extract::{Extension, Json, Path},
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;

use crate::{
    domain::repositories::job_repository::JobRepository,
    domain::services::scrape_engine::ScrapeEngine, presentation::errors::AppError,
    utils::errors::RepositoryError,
};

/// 列出活跃作业
pub async fn list_active(Extension(engine): Extension<Arc<ScrapeEngine>>) -> impl IntoResponse {
    Json(engine.list_active_jobs())
}

/// 查询作业
///
/// 返回持久化的作业记录；作业仍活跃时附带实时进度
pub async fn get_job(
    Path(id): Path<i32>,
    Extension(engine): Extension<Arc<ScrapeEngine>>,
    Extension(jobs): Extension<Arc<dyn JobRepository>>,
) -> Result<impl IntoResponse, AppError> {
    let job = jobs.find_by_id(id).await?.ok_or(RepositoryError::NotFound)?;
    let progress = engine.tracker().progress_of(id);

    Ok(Json(json!({
        "success": true,
        "job": job,
        "progress": progress,
    })))
}

pub async fn pause_job(
    Path(id): Path<i32>,
    Extension(engine): Extension<Arc<ScrapeEngine>>,
) -> impl IntoResponse {
    Json(json!({ "success": engine.pause_job(id).await }))
}

pub async fn resume_job(
    Path(id): Path<i32>,
    Extension(engine): Extension<Arc<ScrapeEngine>>,
) -> impl IntoResponse {
    Json(json!({ "success": engine.resume_job(id).await }))
}

pub async fn cancel_job(
    Path(id): Path<i32>,
    Extension(engine): Extension<Arc<ScrapeEngine>>,
) -> impl IntoResponse {
    Json(json!({ "success": engine.cancel_job(id).await }))
}
