// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    build_engine, card_page, test_options, wait_until, InMemoryLeads, ScriptedFetcher,
};
use leadrs::domain::models::job::JobStatus;
use leadrs::domain::models::lead::EmailStatus;
use leadrs::domain::models::source::NewSource;
use leadrs::utils::errors::ScrapeError;
use serde_json::json;
use std::time::Duration;

const URL: &str = "https://offices.example.com/relocations";
const LISTING_URL: &str = "https://www.realcommercial.com.au/for-lease";

fn configured_source() -> NewSource {
    NewSource::new(
        "Office moves",
        URL,
        json!({
            "containerSelector": ".card",
            "fieldSelectors": {
                "companyName": ".name",
                "address": ".address"
            }
        }),
    )
}

fn cards(n: usize) -> String {
    let names: Vec<String> = (1..=n).map(|i| format!("Company {}", i)).collect();
    let cards: Vec<(Option<&str>, &str)> = names
        .iter()
        .map(|name| (Some(name.as_str()), "1 George St, Sydney, NSW 2000"))
        .collect();
    card_page(&cards)
}

/// 三张卡片中两张有名称：找到2条、入库2条、作业完成
#[tokio::test]
async fn test_three_cards_two_named_completes() {
    let page = card_page(&[
        (Some("Acme Pty Ltd"), "Level 3, 20 Bridge St"),
        (None, "Unit 4, 9 Pitt St"),
        (Some("Globex"), "5 King St"),
    ]);
    let t = build_engine(
        ScriptedFetcher::default().page(URL, &page),
        InMemoryLeads::default(),
        test_options(),
    );
    let source = t.add_source(configured_source()).await;

    let run = t.engine.start_scrape(source.clone()).await.unwrap();
    let job_id = run.job_id();
    assert_eq!(run.job().status, JobStatus::Running);
    assert_eq!(run.wait().await, 2);

    let job = t.jobs.get(job_id);
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.leads_found, Some(2));
    assert_eq!(job.leads_added, Some(2));
    assert!(job.end_time.unwrap() >= job.start_time);
    assert!(job.error.is_none());

    let leads = t.leads.all();
    assert_eq!(leads[0].data.company_name, "Acme Pty Ltd");
    assert_eq!(leads[1].data.company_name, "Globex");
    assert!(leads.iter().all(|l| l.scraped_from == URL));
    assert!(leads.iter().all(|l| l.email_status == EmailStatus::Failed));

    assert!(t.sources.get(source.id).last_scraped.is_some());
    assert!(!t.engine.is_running(source.id));
    assert!(t.engine.list_active_jobs().is_empty());
}

/// 同一抓取源重复启动：只创建一个作业，第二次返回并发错误
#[tokio::test]
async fn test_double_start_creates_single_job() {
    let (leads, gate) = InMemoryLeads::gated();
    let t = build_engine(
        ScriptedFetcher::default().page(URL, &cards(2)),
        leads,
        test_options(),
    );
    let source = t.add_source(configured_source()).await;

    let first = t.engine.start_scrape(source.clone()).await.unwrap();
    let second = t.engine.start_scrape(source.clone()).await;

    assert!(matches!(
        second,
        Err(ScrapeError::Concurrency { source_id }) if source_id == source.id
    ));
    assert_eq!(t.jobs.all().len(), 1);
    assert!(t.engine.is_running(source.id));

    gate.add_permits(10);
    assert_eq!(first.wait().await, 2);

    // A finished source can be scraped again
    let again = t.engine.start_scrape(source).await.unwrap();
    assert_eq!(again.wait().await, 2);
    assert_eq!(t.jobs.all().len(), 2);
}

/// 进度在提取后为50，每入库一条单调增加
#[tokio::test]
async fn test_progress_is_reported_per_lead() {
    let (leads, gate) = InMemoryLeads::gated();
    let t = build_engine(
        ScriptedFetcher::default().page(URL, &cards(2)),
        leads,
        test_options(),
    );
    let source = t.add_source(configured_source()).await;
    let run = t.engine.start_scrape(source).await.unwrap();
    let job_id = run.job_id();
    let tracker = t.engine.tracker().clone();

    wait_until(|| tracker.progress_of(job_id) == Some(50)).await;
    gate.add_permits(1);
    wait_until(|| tracker.progress_of(job_id) == Some(75)).await;

    let active = t.engine.list_active_jobs();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].job_id, job_id);
    assert_eq!(active[0].status, JobStatus::Running);

    gate.add_permits(1);
    assert_eq!(run.wait().await, 2);
    assert_eq!(tracker.progress_of(job_id), None);
}

/// 运行中取消：作业为 cancelled，记录部分计数，从不标记完成
#[tokio::test]
async fn test_cancel_mid_run_records_partial_count() {
    let (leads, gate) = InMemoryLeads::gated();
    let t = build_engine(
        ScriptedFetcher::default().page(URL, &cards(5)),
        leads,
        test_options(),
    );
    let source = t.add_source(configured_source()).await;
    let run = t.engine.start_scrape(source.clone()).await.unwrap();
    let job_id = run.job_id();

    gate.add_permits(2);
    let leads = t.leads.clone();
    wait_until(|| leads.count() == 2).await;

    assert!(t.engine.cancel_job(job_id).await);
    assert!(!t.engine.is_running(source.id));
    assert_eq!(t.jobs.get(job_id).status, JobStatus::Cancelled);

    gate.add_permits(10);
    let added = run.wait().await;
    assert!((2..5).contains(&added));

    let job = t.jobs.get(job_id);
    assert_eq!(job.status, JobStatus::Cancelled);
    assert_eq!(job.leads_found, Some(5));
    assert_eq!(job.leads_added, Some(added as i32));
    assert!(job.end_time.is_some());
    assert!(t.sources.get(source.id).last_scraped.is_none());

    assert!(!t.engine.cancel_job(job_id).await);
}

/// 暂停期间不再入库，恢复后继续直到完成
#[tokio::test]
async fn test_pause_freezes_persistence_until_resume() {
    let (leads, gate) = InMemoryLeads::gated();
    let t = build_engine(
        ScriptedFetcher::default().page(URL, &cards(4)),
        leads,
        test_options(),
    );
    let source = t.add_source(configured_source()).await;
    let run = t.engine.start_scrape(source.clone()).await.unwrap();
    let job_id = run.job_id();

    gate.add_permits(1);
    let leads = t.leads.clone();
    wait_until(|| leads.count() == 1).await;

    assert!(t.engine.pause_job(job_id).await);
    assert!(!t.engine.pause_job(job_id).await);
    assert_eq!(t.jobs.get(job_id).status, JobStatus::Paused);
    assert!(t.engine.is_running(source.id));

    gate.add_permits(10);
    tokio::time::sleep(Duration::from_millis(100)).await;
    let frozen = t.leads.count();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(t.leads.count(), frozen);
    assert!(frozen <= 2);

    assert!(t.engine.resume_job(job_id).await);
    assert!(!t.engine.resume_job(job_id).await);
    assert_eq!(run.wait().await, 4);

    let job = t.jobs.get(job_id);
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.leads_added, Some(4));
}

/// 暂停超过最长时间后作业失败，保留已入库数量
#[tokio::test]
async fn test_pause_longer_than_limit_fails_job() {
    let (leads, gate) = InMemoryLeads::gated();
    let mut options = test_options();
    options.max_pause = Some(Duration::from_millis(50));
    let t = build_engine(
        ScriptedFetcher::default().page(URL, &cards(3)),
        leads,
        options,
    );
    let source = t.add_source(configured_source()).await;
    let run = t.engine.start_scrape(source.clone()).await.unwrap();
    let job_id = run.job_id();

    gate.add_permits(1);
    let leads = t.leads.clone();
    wait_until(|| leads.count() == 1).await;
    assert!(t.engine.pause_job(job_id).await);
    gate.add_permits(10);

    let added = run.wait().await;
    assert!((1..3).contains(&added));

    let job = t.jobs.get(job_id);
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.unwrap().starts_with("paused longer than"));
    assert_eq!(job.leads_added, Some(added as i32));
    assert!(!t.engine.is_running(source.id));
}

/// 暂停中的作业被取消后立即结束，不等待下一次轮询
#[tokio::test]
async fn test_cancel_while_paused_finishes_promptly() {
    let (leads, gate) = InMemoryLeads::gated();
    let mut options = test_options();
    options.max_pause = None;
    options.pause_poll_interval = Duration::from_secs(30);
    let t = build_engine(
        ScriptedFetcher::default().page(URL, &cards(4)),
        leads,
        options,
    );
    let source = t.add_source(configured_source()).await;
    let run = t.engine.start_scrape(source.clone()).await.unwrap();
    let job_id = run.job_id();

    gate.add_permits(1);
    let leads = t.leads.clone();
    wait_until(|| leads.count() == 1).await;
    assert!(t.engine.pause_job(job_id).await);
    gate.add_permits(10);

    assert!(t.engine.cancel_job(job_id).await);
    let added = tokio::time::timeout(Duration::from_secs(3), run.wait())
        .await
        .expect("cancelled run should not wait for the poll interval");
    assert!((1..=2).contains(&added));

    let job = t.jobs.get(job_id);
    assert_eq!(job.status, JobStatus::Cancelled);
    assert_eq!(job.leads_found, Some(4));
    assert_eq!(job.leads_added, Some(added as i32));
    assert!(!t.engine.is_running(source.id));
}

/// 配置的容器选择器没有匹配时启用通用层，并拆分地址
#[tokio::test]
async fn test_generic_fallback_when_container_matches_nothing() {
    let page = r#"
        <div class="listing-card">
            <h3>Initech</h3>
            <p class="address">200 Main St, Springfield, NSW 2000</p>
            <span class="category">Software</span>
        </div>
    "#;
    let t = build_engine(
        ScriptedFetcher::default().page(URL, page),
        InMemoryLeads::default(),
        test_options(),
    );
    let mut new_source = configured_source();
    new_source.selectors = json!({
        "containerSelector": ".does-not-exist",
        "fieldSelectors": { "companyName": ".name" }
    });
    let source = t.add_source(new_source).await;

    let run = t.engine.start_scrape(source).await.unwrap();
    assert_eq!(run.wait().await, 1);

    let lead = &t.leads.all()[0];
    assert_eq!(lead.data.company_name, "Initech");
    assert_eq!(lead.data.city.as_deref(), Some("Springfield"));
    assert_eq!(lead.data.state.as_deref(), Some("NSW"));
    assert_eq!(lead.data.zip_code.as_deref(), Some("2000"));
    assert_eq!(lead.data.industry.as_deref(), Some("Software"));
}

/// 缺少 companyName 选择器：由通用层兜底，否则作业失败，绝不空成功
#[tokio::test]
async fn test_missing_company_name_never_succeeds_empty() {
    let invalid = json!({ "containerSelector": ".card", "fieldSelectors": {} });

    let t = build_engine(
        ScriptedFetcher::default().page(URL, &cards(1)),
        InMemoryLeads::default(),
        test_options(),
    );
    let mut new_source = configured_source();
    new_source.selectors = invalid.clone();
    let source = t.add_source(new_source).await;
    let run = t.engine.start_scrape(source).await.unwrap();
    let job_id = run.job_id();
    assert_eq!(run.wait().await, 1);
    assert_eq!(t.jobs.get(job_id).status, JobStatus::Completed);

    let t = build_engine(
        ScriptedFetcher::default().page(URL, "<html><body><p>Nothing</p></body></html>"),
        InMemoryLeads::default(),
        test_options(),
    );
    let mut new_source = configured_source();
    new_source.selectors = invalid;
    let source = t.add_source(new_source).await;
    let run = t.engine.start_scrape(source).await.unwrap();
    let job_id = run.job_id();
    assert_eq!(run.wait().await, 0);

    let job = t.jobs.get(job_id);
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.unwrap().contains("companyName"));
}

/// 挂牌站点使用专用层
#[tokio::test]
async fn test_listing_site_uses_specialized_tier() {
    let page = r#"
        <article class="listing">
            <h3>Harbour View Suites</h3>
            <p class="address">Level 5, 100 Harbour St, Sydney, NSW 2000</p>
            <span class="agency-name">Coastal Commercial</span>
            <a href="tel:0291234567">Call</a>
            <span class="floor-area">350 m²</span>
        </article>
    "#;
    let t = build_engine(
        ScriptedFetcher::default().page(LISTING_URL, page),
        InMemoryLeads::default(),
        test_options(),
    );
    let source = t
        .add_source(NewSource::new("Listings", LISTING_URL, json!(null)))
        .await;

    let run = t.engine.start_scrape(source).await.unwrap();
    assert_eq!(run.wait().await, 1);

    let lead = &t.leads.all()[0];
    assert_eq!(lead.data.company_name, "Harbour View Suites");
    assert_eq!(lead.data.city.as_deref(), Some("Sydney"));
    assert_eq!(lead.data.contact_name.as_deref(), Some("Coastal Commercial"));
    assert_eq!(lead.data.contact_phone.as_deref(), Some("0291234567"));
    assert_eq!(lead.data.office_size.as_deref(), Some("350 m²"));
}

/// 获取失败：作业失败并记录状态码，返回0
#[tokio::test]
async fn test_fetch_failure_marks_job_failed() {
    let t = build_engine(
        ScriptedFetcher::default().status(URL, 404),
        InMemoryLeads::default(),
        test_options(),
    );
    let source = t.add_source(configured_source()).await;

    let run = t.engine.start_scrape(source.clone()).await.unwrap();
    let job_id = run.job_id();
    assert_eq!(run.wait().await, 0);

    let job = t.jobs.get(job_id);
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.unwrap().contains("404"));
    assert!(job.end_time.is_some());
    assert_eq!(t.fetcher.calls(), 1);
    assert!(!t.engine.is_running(source.id));
    assert!(t.sources.get(source.id).last_scraped.is_none());
}

/// 单条入库失败被跳过，作业仍然完成
#[tokio::test]
async fn test_lead_write_failure_is_skipped() {
    let t = build_engine(
        ScriptedFetcher::default().page(URL, &cards(3)),
        InMemoryLeads::rejecting("Company 2"),
        test_options(),
    );
    let source = t.add_source(configured_source()).await;

    let run = t.engine.start_scrape(source).await.unwrap();
    let job_id = run.job_id();
    assert_eq!(run.wait().await, 2);

    let job = t.jobs.get(job_id);
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.leads_found, Some(3));
    assert_eq!(job.leads_added, Some(2));
}

/// 停用的抓取源不会创建作业
#[tokio::test]
async fn test_disabled_source_is_rejected() {
    let t = build_engine(
        ScriptedFetcher::default().page(URL, &cards(1)),
        InMemoryLeads::default(),
        test_options(),
    );
    let mut new_source = configured_source();
    new_source.enabled = false;
    let source = t.add_source(new_source).await;

    let result = t.engine.start_scrape_by_id(source.id).await;
    assert!(matches!(result, Err(ScrapeError::SourceDisabled(id)) if id == source.id));
    assert!(t.jobs.all().is_empty());

    let result = t.engine.start_scrape_by_id(999).await;
    assert!(matches!(result, Err(ScrapeError::SourceNotFound(999))));
}

/// 未知作业的控制操作返回 false
#[tokio::test]
async fn test_controls_on_unknown_job_return_false() {
    let t = build_engine(
        ScriptedFetcher::default(),
        InMemoryLeads::default(),
        test_options(),
    );

    assert!(!t.engine.pause_job(42).await);
    assert!(!t.engine.resume_job(42).await);
    assert!(!t.engine.cancel_job(42).await);
}
