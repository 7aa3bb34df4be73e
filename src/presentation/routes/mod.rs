// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::{
    job_repository::JobRepository, lead_repository::LeadRepository,
    source_repository::SourceRepository,
};
use crate::domain::services::scrape_engine::ScrapeEngine;
use crate::presentation::handlers::{job_handler, source_handler};
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 返回值
///
/// 返回未挂载依赖的路由，依赖通过 [`app`] 注入
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let source_routes = Router::new()
        .route(
            "/v1/sources",
            post(source_handler::create_source).get(source_handler::list_sources),
        )
        .route("/v1/sources/{id}/scrape", post(source_handler::start_scrape))
        .route("/v1/sources/{id}/leads", get(source_handler::list_leads));

    let job_routes = Router::new()
        .route("/v1/jobs/active", get(job_handler::list_active))
        .route(
            "/v1/jobs/{id}",
            get(job_handler::get_job).delete(job_handler::cancel_job),
        )
        .route("/v1/jobs/{id}/pause", post(job_handler::pause_job))
        .route("/v1/jobs/{id}/resume", post(job_handler::resume_job));

    Router::new()
        .merge(public_routes)
        .merge(source_routes)
        .merge(job_routes)
}

/// 组装完整应用
///
/// # 参数
///
/// * `engine` - 抓取引擎
/// * `jobs` - 作业仓库
/// * `sources` - 抓取源仓库
/// * `leads` - 线索仓库
pub fn app(
    engine: Arc<ScrapeEngine>,
    jobs: Arc<dyn JobRepository>,
    sources: Arc<dyn SourceRepository>,
    leads: Arc<dyn LeadRepository>,
) -> Router {
    routes()
        .layer(Extension(engine))
        .layer(Extension(jobs))
        .layer(Extension(sources))
        .layer(Extension(leads))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
