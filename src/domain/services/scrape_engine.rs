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

use crate::domain::models::job::{DomainError, JobStatus, JobUpdate, ScrapingJob};
use crate::domain::models::lead::NewLead;
use crate::domain::models::source::{ScrapingSource, SourceUpdate};
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::lead_repository::LeadRepository;
use crate::domain::repositories::source_repository::SourceRepository;
use crate::domain::services::extraction::{ExtractionError, ExtractionPipeline};
use crate::domain::services::job_tracker::{ActiveJobSnapshot, JobControl, JobTracker};
use crate::engines::traits::{FetchError, FetchRequest, FetchedPage, PageFetcher};
use crate::utils::errors::{RepositoryError, ScrapeError};
use crate::utils::retry_policy::RetryPolicy;
use chrono::Utc;
use metrics::counter;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// 引擎运行参数
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// 单次请求超时
    pub request_timeout: Duration,
    /// 请求使用的 User-Agent
    pub user_agent: String,
    /// 暂停期间重新检查状态的间隔
    pub pause_poll_interval: Duration,
    /// 最长暂停时间，超过后作业失败；None 表示不限
    pub max_pause: Option<Duration>,
    /// 页面获取重试策略
    pub retry_policy: RetryPolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (compatible; leadrs/1.0)".to_string(),
            pause_poll_interval: Duration::from_secs(1),
            max_pause: Some(Duration::from_secs(3600)),
            retry_policy: RetryPolicy::default(),
        }
    }
}

/// 一次后台运行的句柄
#[derive(Debug)]
pub struct ScrapeRun {
    job: ScrapingJob,
    handle: JoinHandle<usize>,
}

impl ScrapeRun {
    pub fn job_id(&self) -> i32 {
        self.job.id
    }

    /// 创建时的作业记录
    pub fn job(&self) -> &ScrapingJob {
        &self.job
    }

    /// 等待运行结束，返回成功入库的线索数
    pub async fn wait(self) -> usize {
        match self.handle.await {
            Ok(added) => added,
            Err(e) => {
                error!(job_id = self.job.id, error = %e, "Scrape task aborted");
                0
            }
        }
    }
}

/// 运行结果
#[derive(Debug)]
enum Outcome {
    Completed { found: usize, added: usize },
    Cancelled { found: usize, added: usize },
    /// 作业在外部进入终态，不再写入
    Stopped { added: usize },
    PauseExpired { found: usize, added: usize, limit: Duration },
    Failed(ScrapeError),
}

/// 检查点结果
#[derive(Debug, PartialEq, Eq)]
enum Checkpoint {
    Proceed,
    Cancelled,
    Stopped,
    Expired(Duration),
}

/// 抓取引擎
///
/// 负责单个抓取源一次运行的完整状态机：
/// 登记 → 创建作业 → 获取 → 提取 → 逐条入库 → 结束。
/// 运行在独立的 tokio 任务中，`start_scrape` 立即返回。
pub struct ScrapeEngine {
    fetcher: Arc<dyn PageFetcher>,
    jobs: Arc<dyn JobRepository>,
    sources: Arc<dyn SourceRepository>,
    leads: Arc<dyn LeadRepository>,
    tracker: Arc<JobTracker>,
    pipeline: ExtractionPipeline,
    options: EngineOptions,
}

impl ScrapeEngine {
    /// 创建新的抓取引擎
    ///
    /// # 参数
    ///
    /// * `fetcher` - 页面获取器
    /// * `jobs` - 作业仓库
    /// * `sources` - 抓取源仓库
    /// * `leads` - 线索仓库
    /// * `tracker` - 作业跟踪器
    /// * `options` - 运行参数
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        jobs: Arc<dyn JobRepository>,
        sources: Arc<dyn SourceRepository>,
        leads: Arc<dyn LeadRepository>,
        tracker: Arc<JobTracker>,
        options: EngineOptions,
    ) -> Self {
        Self {
            fetcher,
            jobs,
            sources,
            leads,
            tracker,
            pipeline: ExtractionPipeline::standard(),
            options,
        }
    }

    /// 替换提取策略链
    pub fn with_pipeline(mut self, pipeline: ExtractionPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn tracker(&self) -> &Arc<JobTracker> {
        &self.tracker
    }

    /// 启动一次抓取
    ///
    /// # 返回值
    ///
    /// * `Ok(ScrapeRun)` - 作业已创建并在后台运行
    /// * `Err(ScrapeError::SourceDisabled)` - 抓取源已停用
    /// * `Err(ScrapeError::Concurrency)` - 该抓取源已有活跃作业，不会创建作业记录
    /// * `Err(ScrapeError::Persistence)` - 作业记录创建失败
    pub async fn start_scrape(
        self: &Arc<Self>,
        source: ScrapingSource,
    ) -> Result<ScrapeRun, ScrapeError> {
        if !source.enabled {
            return Err(ScrapeError::SourceDisabled(source.id));
        }

        let mut control = self.tracker.reserve(source.id)?;
        let job = match self.jobs.create(source.id).await {
            Ok(job) => job,
            Err(e) => {
                self.tracker.release(&control);
                return Err(e.into());
            }
        };
        self.tracker.bind(&mut control, job.id);

        counter!("leadrs_jobs_total", "status" => "started").increment(1);
        info!(job_id = job.id, source_id = source.id, url = %source.url, "Scrape job started");

        let engine = Arc::clone(self);
        let handle = tokio::spawn(engine.run(job.id, source, control));
        Ok(ScrapeRun { job, handle })
    }

    /// 按ID加载抓取源并启动抓取
    pub async fn start_scrape_by_id(
        self: &Arc<Self>,
        source_id: i32,
    ) -> Result<ScrapeRun, ScrapeError> {
        let source = self
            .sources
            .find_by_id(source_id)
            .await?
            .ok_or(ScrapeError::SourceNotFound(source_id))?;
        self.start_scrape(source).await
    }

    pub fn is_running(&self, source_id: i32) -> bool {
        self.tracker.is_running(source_id)
    }

    pub fn list_active_jobs(&self) -> Vec<ActiveJobSnapshot> {
        self.tracker.list_active()
    }

    pub async fn pause_job(&self, job_id: i32) -> bool {
        self.tracker.pause(job_id).await
    }

    pub async fn resume_job(&self, job_id: i32) -> bool {
        self.tracker.resume(job_id).await
    }

    pub async fn cancel_job(&self, job_id: i32) -> bool {
        self.tracker.cancel(job_id).await
    }

    #[instrument(skip(self, source, control), fields(source_id = source.id))]
    async fn run(self: Arc<Self>, job_id: i32, source: ScrapingSource, mut control: JobControl) -> usize {
        let started = Instant::now();
        let outcome = self.execute(job_id, &source, &mut control).await;
        let added = self.finalize(job_id, &source, outcome).await;
        self.tracker.finish(&control);
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Scrape run finished");
        added
    }

    async fn execute(
        &self,
        job_id: i32,
        source: &ScrapingSource,
        control: &mut JobControl,
    ) -> Outcome {
        let page = match self.fetch(source).await {
            Ok(page) => page,
            Err(_) if control.is_cancelled() => return Outcome::Cancelled { found: 0, added: 0 },
            Err(e) => return Outcome::Failed(e.into()),
        };

        if control.is_cancelled() {
            return Outcome::Cancelled { found: 0, added: 0 };
        }

        let extraction = match self.pipeline.run(&page.content, source, Utc::now()) {
            Ok(extraction) => extraction,
            Err(ExtractionError::Configuration(e)) => return Outcome::Failed(e.into()),
            Err(ExtractionError::Empty { attempts }) => {
                return Outcome::Failed(ScrapeError::ExtractionEmpty(attempts.join("; ")))
            }
        };

        counter!("leadrs_extraction_tier_total", "tier" => extraction.tier).increment(1);
        let total = extraction.leads.len();
        info!(tier = extraction.tier, found = total, "Extraction finished");
        self.tracker
            .set_progress(job_id, if total == 0 { 100 } else { 50 });

        let mut added = 0;
        for (index, data) in extraction.leads.into_iter().enumerate() {
            match self.checkpoint(control).await {
                Checkpoint::Proceed => {}
                Checkpoint::Cancelled => return Outcome::Cancelled { found: total, added },
                Checkpoint::Stopped => return Outcome::Stopped { added },
                Checkpoint::Expired(limit) => {
                    return Outcome::PauseExpired {
                        found: total,
                        added,
                        limit,
                    }
                }
            }

            let lead = NewLead::from_scraped(data, &source.url);
            match self.leads.create(&lead).await {
                Ok(_) => {
                    added += 1;
                    counter!("leadrs_leads_persisted_total").increment(1);
                }
                Err(e) => {
                    counter!("leadrs_lead_persist_failures_total").increment(1);
                    warn!(index, company = %lead.data.company_name, error = %e, "Failed to persist lead, skipping");
                }
            }
            self.tracker.set_progress(job_id, progress(index, total));
        }

        if control.is_cancelled() {
            return Outcome::Cancelled { found: total, added };
        }
        Outcome::Completed {
            found: total,
            added,
        }
    }

    /// 获取页面，可重试错误按重试策略退避
    async fn fetch(&self, source: &ScrapingSource) -> Result<FetchedPage, FetchError> {
        let mut request = FetchRequest::new(source.url.clone());
        request.timeout = self.options.request_timeout;
        request.user_agent = self.options.user_agent.clone();
        if let Some(credential) = source.auth_credential.as_deref().filter(|c| !c.is_empty()) {
            request
                .headers
                .insert("Authorization".to_string(), credential.to_string());
        }

        let fetcher = &self.fetcher;
        let request = &request;
        let page = self
            .options
            .retry_policy
            .run(move || fetcher.fetch(request), FetchError::is_retryable)
            .await?;
        debug!(
            fetcher = self.fetcher.name(),
            status = page.status_code,
            bytes = page.content.len(),
            "Page fetched"
        );
        Ok(page)
    }

    /// 处理下一条线索前的检查点
    ///
    /// 暂停时阻塞（不持有任何锁）直到恢复、取消、进入终态或超过最长暂停时间。
    async fn checkpoint(&self, control: &mut JobControl) -> Checkpoint {
        let mut paused_since: Option<Instant> = None;
        loop {
            match control.status() {
                JobStatus::Running => return Checkpoint::Proceed,
                JobStatus::Cancelled => return Checkpoint::Cancelled,
                JobStatus::Completed | JobStatus::Failed => return Checkpoint::Stopped,
                JobStatus::Paused => {
                    let since = *paused_since.get_or_insert_with(|| {
                        debug!("Job paused, waiting");
                        Instant::now()
                    });
                    if let Some(limit) = self.options.max_pause {
                        if since.elapsed() >= limit {
                            return Checkpoint::Expired(limit);
                        }
                    }
                    let wait = match self.options.max_pause {
                        Some(limit) => self
                            .options
                            .pause_poll_interval
                            .min(limit.saturating_sub(since.elapsed())),
                        None => self.options.pause_poll_interval,
                    };
                    if !control.wait_for_change(wait).await && control.is_detached() {
                        // Entry removed while paused, nothing left to resume it
                        if control.status() == JobStatus::Paused {
                            return Checkpoint::Stopped;
                        }
                    }
                }
            }
        }
    }

    async fn finalize(&self, job_id: i32, source: &ScrapingSource, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Completed { found, added } => {
                match self
                    .jobs
                    .update(job_id, &JobUpdate::completed(found as i32, added as i32))
                    .await
                {
                    Ok(Some(_)) => {}
                    Ok(None) => warn!(job_id, "Job record disappeared"),
                    Err(RepositoryError::Domain(DomainError::AlreadyTerminal(
                        JobStatus::Cancelled,
                    ))) => {
                        // Cancelled after the last checkpoint
                        return self.finalize_cancelled(job_id, found, added).await;
                    }
                    Err(e) => error!(job_id, error = %e, "Failed to persist job update"),
                }
                if let Err(e) = self
                    .sources
                    .update(source.id, &SourceUpdate::last_scraped(Utc::now()))
                    .await
                {
                    warn!(error = %e, "Failed to update source last_scraped");
                }
                counter!("leadrs_jobs_total", "status" => "completed").increment(1);
                info!(found, added, "Scrape job completed");
                added
            }
            Outcome::Cancelled { found, added } => {
                self.finalize_cancelled(job_id, found, added).await
            }
            Outcome::Stopped { added } => {
                info!(added, "Scrape job stopped externally");
                added
            }
            Outcome::PauseExpired {
                found,
                added,
                limit,
            } => {
                let error = ScrapeError::PauseExpired(limit.as_secs());
                self.record(
                    job_id,
                    &JobUpdate::failed(error.to_string()).with_counts(found as i32, added as i32),
                )
                .await;
                counter!("leadrs_jobs_total", "status" => "failed").increment(1);
                error!(found, added, "Scrape job failed: {}", error);
                added
            }
            Outcome::Failed(e) => {
                self.record(job_id, &JobUpdate::failed(e.to_string())).await;
                counter!("leadrs_jobs_total", "status" => "failed").increment(1);
                error!(status = e.http_status(), "Scrape job failed: {}", e);
                0
            }
        }
    }

    async fn finalize_cancelled(&self, job_id: i32, found: usize, added: usize) -> usize {
        self.record(job_id, &JobUpdate::counts(found as i32, added as i32))
            .await;
        // Covers a failed cancellation write in the tracker
        if let Ok(Some(job)) = self.jobs.find_by_id(job_id).await {
            if !job.status.is_terminal() {
                self.record(
                    job_id,
                    &JobUpdate::cancelled().with_counts(found as i32, added as i32),
                )
                .await;
            }
        }
        counter!("leadrs_jobs_total", "status" => "cancelled").increment(1);
        info!(found, added, "Scrape job cancelled");
        added
    }

    async fn record(&self, job_id: i32, update: &JobUpdate) {
        match self.jobs.update(job_id, update).await {
            Ok(Some(_)) => {}
            Ok(None) => warn!(job_id, "Job record disappeared"),
            Err(e) => error!(job_id, error = %e, "Failed to persist job update"),
        }
    }
}

/// 入库阶段的进度：50 + floor((index + 1) / total * 50)
fn progress(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = (index + 1).min(total);
    (50 + done * 50 / total) as u8
}
