//! 元数据源定义
//!
//! 宿主通过此接口调用识别与封面下载，入口从不返回错误，
//! 失败只体现为更少 (或零) 条结果，细节见日志。

use async_trait::async_trait;
use strum::Display;
use tokio_util::sync::CancellationToken;

use crate::core::event::ResultSender;
use crate::core::model::{Identifiers, LookupQuery, MetadataRecord, SearchResultRankKey};

/// 元数据源支持的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    Identify,
    Cover,
}

/// 元数据源声明会写入的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchedField {
    Title,
    Authors,
    /// 本来源的标识 `identifier:<provider-key>`
    Identifier(&'static str),
    Comments,
    Publisher,
    Languages,
    Tags,
    Pubdate,
}

impl std::fmt::Display for TouchedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TouchedField::Title => write!(f, "title"),
            TouchedField::Authors => write!(f, "authors"),
            TouchedField::Identifier(key) => write!(f, "identifier:{}", key),
            TouchedField::Comments => write!(f, "comments"),
            TouchedField::Publisher => write!(f, "publisher"),
            TouchedField::Languages => write!(f, "languages"),
            TouchedField::Tags => write!(f, "tags"),
            TouchedField::Pubdate => write!(f, "pubdate"),
        }
    }
}

/// 元数据源的静态描述
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub version: (u32, u32, u32),
    pub capabilities: &'static [Capability],
    pub touched_fields: &'static [TouchedField],
    pub has_html_comments: bool,
    pub supports_gzip_transfer_encoding: bool,
    pub can_get_multiple_covers: bool,
}

impl SourceInfo {
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// 详情页链接 (provider-key, id, url)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookUrl {
    pub provider: &'static str,
    pub id: String,
    pub url: String,
}

/// 排序键生成函数
pub type RankKeyFn = fn(&MetadataRecord) -> SearchResultRankKey;

/// 元数据源 Trait
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// 静态描述
    fn info(&self) -> &SourceInfo;

    /// 已知 id 时的详情页链接
    fn get_book_url(&self, identifiers: &Identifiers) -> Option<BookUrl>;

    /// 详情页链接的显示名称
    fn get_book_url_name(&self) -> &str;

    /// 无需联网即可推导的封面地址
    fn get_cached_cover_url(&self, identifiers: &Identifiers) -> Option<String>;

    /// 从详情页 URL 解析 id
    fn id_from_url(&self, url: &str) -> Option<String>;

    /// 宿主合并多个来源结果时使用的排序键
    fn identify_results_keygen(&self, query: &LookupQuery) -> RankKeyFn;

    /// 识别书籍，记录逐条投递到 `results`，返回投递条数
    async fn identify(
        &self,
        query: &LookupQuery,
        results: &ResultSender,
        abort: &CancellationToken,
    ) -> usize;

    /// 下载封面，图片逐张投递到 `results`，返回投递张数
    async fn download_cover(
        &self,
        query: &LookupQuery,
        get_best_cover: bool,
        results: &ResultSender,
        abort: &CancellationToken,
    ) -> usize;
}
