//! 晋江文学城元数据源
//!
//! - `markup`：字节解码与文档树构建
//! - `extract`：详情页/搜索页字段提取
//! - `cover`：封面地址策略
//! - `identify`：按 id 或按书名识别
//! - `download`：封面下载

mod cover;
mod download;
mod extract;
mod identify;
mod markup;
mod selectors;
mod urls;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;
use tokio_util::sync::CancellationToken;

use crate::core::config::{NetworkConfig, SiteConfig};
use crate::core::error::Result;
use crate::core::event::ResultSender;
use crate::core::model::{Identifiers, LookupQuery, MetadataRecord};
use crate::interfaces::source::RankKeyFn;
use crate::interfaces::{BookUrl, Capability, Fetcher, MetadataSource, SourceInfo, TouchedField};

pub use self::cover::{
    custom_cover_fetch_url, is_author_space_host, is_author_space_path, original_resolution_url, resolve_cover,
    resolve_cover_url, strip_resolution_suffix,
};
pub use self::extract::{
    DetailFields, SearchCard, SearchLayout, SearchPage, extract_custom_cover, extract_detail,
    extract_search_page,
};
pub use self::markup::normalize;
pub use self::selectors::SiteSelectors;
pub use self::urls::{CatalogUrls, PROVIDER_ID, book_url, id_from_url};

pub const PUBLISHER: &str = "晋江文学城";
pub const LANGUAGE: &str = "zh_CN";

pub static INFO: SourceInfo = SourceInfo {
    name: "jjwxc.net",
    description: "Downloads metadata and covers from Jinjiang.",
    version: (1, 2, 6),
    capabilities: &[Capability::Identify, Capability::Cover],
    touched_fields: &[
        TouchedField::Title,
        TouchedField::Authors,
        TouchedField::Identifier(PROVIDER_ID),
        TouchedField::Comments,
        TouchedField::Publisher,
        TouchedField::Languages,
        TouchedField::Tags,
        TouchedField::Pubdate,
    ],
    has_html_comments: true,
    supports_gzip_transfer_encoding: true,
    can_get_multiple_covers: true,
};

/// 晋江元数据源
///
/// 不持有任何可变状态，多个识别任务可以共享同一个实例。
pub struct Jinjiang {
    urls: CatalogUrls,
    fetcher: Arc<dyn Fetcher>,
    /// 下载封面前的固定间隔
    pacing: Duration,
}

impl Jinjiang {
    pub fn new(config: SiteConfig, network: &NetworkConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            urls: CatalogUrls::new(&config),
            fetcher,
            pacing: network.pacing(),
        }
    }

    pub fn urls(&self) -> &CatalogUrls {
        &self.urls
    }

    /// 抓取页面并在同一步内完成解析与提取
    ///
    /// 文档树不跨越 await，提取结果以自有数据返回。
    async fn fetch_document<T, F>(&self, url: &str, timeout: Duration, extract: F) -> Result<T>
    where
        F: FnOnce(&Html) -> Result<T> + Send,
    {
        let raw = self.fetcher.fetch(url, timeout).await?;
        let doc = markup::normalize(&raw)?;
        extract(&doc)
    }

    fn known_id(identifiers: &Identifiers) -> Option<&str> {
        identifiers
            .get(PROVIDER_ID)
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
    }

    fn base_record(title: String, author: String, id: &str) -> MetadataRecord {
        let mut identifiers = Identifiers::new();
        identifiers.insert(PROVIDER_ID.to_string(), id.to_string());
        MetadataRecord {
            title,
            authors: vec![author],
            identifiers,
            comments: String::new(),
            publisher: PUBLISHER.to_string(),
            language: LANGUAGE.to_string(),
            tags: Vec::new(),
            url: book_url(id),
            cover: None,
            pubdate: None,
            search_result_index: None,
        }
    }
}

#[async_trait]
impl MetadataSource for Jinjiang {
    fn info(&self) -> &SourceInfo {
        &INFO
    }

    fn get_book_url(&self, identifiers: &Identifiers) -> Option<BookUrl> {
        Self::known_id(identifiers).map(|id| BookUrl {
            provider: PROVIDER_ID,
            id: id.to_string(),
            url: book_url(id),
        })
    }

    fn get_book_url_name(&self) -> &str {
        PUBLISHER
    }

    fn get_cached_cover_url(&self, identifiers: &Identifiers) -> Option<String> {
        Self::known_id(identifiers).map(|id| self.urls.default_cover_url(id))
    }

    fn id_from_url(&self, url: &str) -> Option<String> {
        id_from_url(url)
    }

    fn identify_results_keygen(&self, _query: &LookupQuery) -> RankKeyFn {
        MetadataRecord::rank_key
    }

    /// 已知 id 时直接抓详情页，否则按书名搜索
    ///
    /// `abort` 不在识别过程中轮询，取消由宿主在调用前后负责。
    async fn identify(
        &self,
        query: &LookupQuery,
        results: &ResultSender,
        _abort: &CancellationToken,
    ) -> usize {
        let outcome = match Self::known_id(&query.identifiers) {
            Some(id) => self.identify_by_id(id, query, results).await,
            None => self.identify_by_search(query, results).await,
        };

        outcome.unwrap_or_else(|e| {
            e.report("identify failed");
            0
        })
    }

    async fn download_cover(
        &self,
        query: &LookupQuery,
        get_best_cover: bool,
        results: &ResultSender,
        abort: &CancellationToken,
    ) -> usize {
        self.download_covers(query, get_best_cover, results, abort)
            .await
    }
}
