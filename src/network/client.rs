use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::core::config::NetworkConfig;
use crate::core::error::{Result, SourceError};
use crate::interfaces::Fetcher;

/// 基于 reqwest 的页面获取器
///
/// 内部 `reqwest::Client` 自带连接池，可被多个识别任务共享。
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = Self::try_build_internal_client(config)?;
        Ok(Self { client })
    }

    /// 构建底层的 HTTP 客户端
    fn try_build_internal_client(config: &NetworkConfig) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();

        // 基础 Header 注入
        let base_headers = [
            (USER_AGENT, config.user_agent.as_str()),
            (ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9"),
        ];

        headers.extend(
            base_headers
                .into_iter()
                .filter(|(_, v)| !v.is_empty())
                .filter_map(|(k, v)| HeaderValue::from_str(v).ok().map(|val| (k, val))),
        );

        reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .tcp_nodelay(true)
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .build()
            .map_err(SourceError::Network)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Bytes> {
        debug!("GET {} (timeout {:?})", url, timeout);
        let resp = self.client.get(url).timeout(timeout).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status,
                url: url.to_string(),
            });
        }

        Ok(resp.bytes().await?)
    }
}
