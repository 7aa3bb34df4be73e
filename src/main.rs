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

use leadrs::config::settings::Settings;
use leadrs::domain::repositories::{
    job_repository::JobRepository, lead_repository::LeadRepository,
    source_repository::SourceRepository,
};
use leadrs::domain::services::{job_tracker::JobTracker, scrape_engine::ScrapeEngine};
use leadrs::engines::reqwest_engine::ReqwestFetcher;
use leadrs::infrastructure::database::connection;
use leadrs::infrastructure::repositories::{
    job_repo_impl::JobRepositoryImpl, lead_repo_impl::LeadRepositoryImpl,
    source_repo_impl::SourceRepositoryImpl,
};
use leadrs::presentation::routes;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use leadrs::utils::telemetry;
use migration::{Migrator, MigratorTrait};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting leadrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    if let Some(port) = settings.server.metrics_port {
        let addr = SocketAddr::new(settings.server.host.parse()?, port);
        if let Err(e) = leadrs::infrastructure::metrics::init_metrics(addr) {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    }

    // 3. Connect to database
    let db = connection::create_pool(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize components
    let jobs: Arc<dyn JobRepository> = Arc::new(JobRepositoryImpl::new(db.clone()));
    let sources: Arc<dyn SourceRepository> = Arc::new(SourceRepositoryImpl::new(db.clone()));
    let leads: Arc<dyn LeadRepository> = Arc::new(LeadRepositoryImpl::new(db.clone()));

    let fetcher = Arc::new(ReqwestFetcher::new()?);
    let tracker = Arc::new(JobTracker::new(jobs.clone()));
    let engine = Arc::new(ScrapeEngine::new(
        fetcher,
        jobs.clone(),
        sources.clone(),
        leads.clone(),
        tracker,
        settings.scraping.engine_options(),
    ));

    // 5. Start HTTP server
    let app = routes::app(engine, jobs, sources, leads);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
