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

use crate::domain::services::scrape_engine::EngineOptions;
use crate::utils::retry_policy::RetryPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、数据库与抓取引擎的配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 抓取配置
    pub scraping: ScrapeSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
    /// 连接最长存活时间（秒）
    #[serde(default)]
    pub max_lifetime: Option<u64>,
    /// 是否输出 SQL 语句日志
    #[serde(default)]
    pub sqlx_logging: bool,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    /// Prometheus 指标导出端口，未设置时不启动导出器
    pub metrics_port: Option<u16>,
}

/// 抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeSettings {
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 请求使用的 User-Agent
    pub user_agent: String,
    /// 暂停期间检查状态的间隔（毫秒）
    pub pause_poll_interval_ms: u64,
    /// 最长暂停时间（秒），0 表示不限
    pub max_pause_secs: u64,
    /// 页面获取最大重试次数
    pub fetch_max_retries: u32,
    /// 页面获取初始退避（毫秒）
    pub fetch_initial_backoff_ms: u64,
}

impl ScrapeSettings {
    /// 转换为引擎运行参数
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            user_agent: self.user_agent.clone(),
            pause_poll_interval: Duration::from_millis(self.pause_poll_interval_ms.max(1)),
            max_pause: (self.max_pause_secs > 0).then(|| Duration::from_secs(self.max_pause_secs)),
            retry_policy: RetryPolicy::for_fetch(
                self.fetch_max_retries,
                Duration::from_millis(self.fetch_initial_backoff_ms),
            ),
        }
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加默认值、`config/default`、`config/{APP_ENVIRONMENT}` 与
    /// `LEADRS__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.metrics_port", 9000)?
            // Default DB settings
            .set_default("database.url", "sqlite://leadrs.db?mode=rwc")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("database.max_lifetime", 3600)?
            .set_default("database.sqlx_logging", false)?
            // Default scraping settings
            .set_default("scraping.request_timeout_secs", 30)?
            .set_default("scraping.user_agent", "Mozilla/5.0 (compatible; leadrs/1.0)")?
            .set_default("scraping.pause_poll_interval_ms", 1000)?
            .set_default("scraping.max_pause_secs", 3600)?
            .set_default("scraping.fetch_max_retries", 2)?
            .set_default("scraping.fetch_initial_backoff_ms", 500)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("LEADRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
