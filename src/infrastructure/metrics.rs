// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use tracing::info;

/// 登记指标说明
pub fn describe_metrics() {
    describe_counter!(
        "leadrs_jobs_total",
        "Scrape jobs by lifecycle status (started, completed, failed, cancelled)"
    );
    describe_counter!(
        "leadrs_extraction_tier_total",
        "Successful extractions by tier (specialized, configured, generic)"
    );
    describe_counter!("leadrs_leads_persisted_total", "Leads written to storage");
    describe_counter!(
        "leadrs_lead_persist_failures_total",
        "Leads skipped because the write failed"
    );
    describe_gauge!("leadrs_active_jobs", "Jobs currently registered as active");
}

/// 启动 Prometheus 导出器
///
/// # 参数
///
/// * `addr` - 导出器监听地址
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe_metrics();

    info!("Metrics exporter listening on {}", addr);
    Ok(())
}
