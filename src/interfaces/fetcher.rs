use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::core::error::Result;

/// 页面获取接口
///
/// 给定 URL 和超时取回原始字节；网络、超时与 HTTP 状态错误都以
/// `SourceError` 的 Transport 分级返回。实现必须可被多个识别任务并发共享。
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Bytes>;
}
