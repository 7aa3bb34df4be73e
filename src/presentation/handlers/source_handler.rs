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
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::{
    domain::models::{selector_config::SelectorConfig, source::NewSource},
    domain::repositories::{lead_repository::LeadRepository, source_repository::SourceRepository},
    domain::services::scrape_engine::ScrapeEngine,
    presentation::errors::AppError,
    utils::errors::{RepositoryError, ScrapeError},
};

/// 创建抓取源
///
/// 提供了选择器配置时立即校验；空配置的抓取源只依赖专用层与通用层
pub async fn create_source(
    Extension(sources): Extension<Arc<dyn SourceRepository>>,
    Json(payload): Json<NewSource>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    if !payload.selectors.is_null() {
        SelectorConfig::from_value(&payload.selectors).map_err(ScrapeError::from)?;
    }

    let source = sources.create(&payload).await?;
    info!(source_id = source.id, url = %source.url, "Scraping source created");
    Ok((StatusCode::CREATED, Json(source)))
}

/// 列出全部抓取源
pub async fn list_sources(
    Extension(sources): Extension<Arc<dyn SourceRepository>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(sources.list().await?))
}

/// 启动对某个抓取源的抓取
///
/// 立即返回 202 与作业ID，抓取在后台运行
pub async fn start_scrape(
    Path(id): Path<i32>,
    Extension(engine): Extension<Arc<ScrapeEngine>>,
) -> Result<impl IntoResponse, AppError> {
    let run = engine.start_scrape_by_id(id).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "success": true, "job_id": run.job_id() })),
    ))
}

/// 查询抓取源已入库的线索
pub async fn list_leads(
    Path(id): Path<i32>,
    Extension(sources): Extension<Arc<dyn SourceRepository>>,
    Extension(leads): Extension<Arc<dyn LeadRepository>>,
) -> Result<impl IntoResponse, AppError> {
    let source = sources
        .find_by_id(id)
        .await?
        .ok_or(RepositoryError::NotFound)?;
    Ok(Json(leads.find_by_source_url(&source.url).await?))
}
