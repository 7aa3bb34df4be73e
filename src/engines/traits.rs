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

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// 页面获取错误
#[derive(Error, Debug)]
pub enum FetchError {
    /// 非 2xx 响应
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    /// 请求失败（网络、TLS、解码等）
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 无效URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// 无法作为HTTP请求头发送的名称或值，错误中只包含头名称
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl FetchError {
    /// 响应携带的HTTP状态码
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 超时、连接失败、5xx 与 429 返回true，其余返回false
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            FetchError::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            FetchError::Timeout => true,
            FetchError::InvalidUrl(_) | FetchError::InvalidHeader(_) => false,
        }
    }
}

/// 页面获取请求
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 目标URL
    pub url: String,
    /// 请求头
    pub headers: HashMap<String, String>,
    /// 超时时间
    pub timeout: Duration,
    /// User-Agent
    pub user_agent: String,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (compatible; leadrs/1.0)".to_string(),
        }
    }
}

/// 获取到的页面
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// 最终URL
    pub url: String,
    /// HTTP状态码
    pub status_code: u16,
    /// 响应内容
    pub content: String,
    /// 内容类型
    pub content_type: String,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

/// 页面获取特质
///
/// 非 2xx 响应必须以 [`FetchError::Status`] 返回；实现本身不做重试。
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 获取页面
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError>;

    /// 获取器名称
    fn name(&self) -> &'static str;
}
