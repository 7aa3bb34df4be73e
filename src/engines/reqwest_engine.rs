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

use crate::engines::traits::{FetchError, FetchRequest, FetchedPage, PageFetcher};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Instant;
use tracing::debug;

/// 页面获取器
///
/// 基于reqwest实现的基本HTTP获取器
#[derive(Clone, Default)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// 创建新的获取器
    ///
    /// 客户端在获取器生命周期内复用，超时由每个请求单独指定。
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    /// 执行HTTP获取
    ///
    /// # 参数
    ///
    /// * `request` - 获取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchedPage)` - 2xx 响应
    /// * `Err(FetchError)` - 网络错误或非 2xx 响应
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        let url = url::Url::parse(&request.url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", request.url, e)))?;

        // Build headers
        let mut headers = HeaderMap::new();
        for (k, v) in &request.headers {
            let name = HeaderName::from_bytes(k.as_bytes())
                .map_err(|_| FetchError::InvalidHeader(k.clone()))?;
            let value =
                HeaderValue::from_str(v).map_err(|_| FetchError::InvalidHeader(k.clone()))?;
            headers.insert(name, value);
        }

        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, request.user_agent.as_str())
            .headers(headers)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::RequestFailed(e)
                }
            })?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: final_url,
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or("text/html")
            .to_string();

        let content = response.text().await?;
        let response_time_ms = start.elapsed().as_millis() as u64;
        debug!(url = %final_url, status = status.as_u16(), response_time_ms, "Page fetched");

        Ok(FetchedPage {
            url: final_url,
            status_code: status.as_u16(),
            content,
            content_type,
            response_time_ms,
        })
    }

    /// 获取器名称
    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
