use std::cmp::Ordering;
use std::time::Duration;

use bon::Builder;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 来源标识映射 (provider-key -> id)
pub type Identifiers = IndexMap<String, String>;

/// 元数据记录
///
/// 作者至少一位；在搜索模式下附带结果排名。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub title: String,
    pub authors: Vec<String>,
    #[serde(default)]
    pub identifiers: Identifiers,
    /// HTML 片段
    #[serde(default)]
    pub comments: String,
    pub publisher: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubdate: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_result_index: Option<usize>,
}

impl MetadataRecord {
    pub fn identifier(&self, key: &str) -> Option<&str> {
        self.identifiers.get(key).map(String::as_str)
    }

    pub fn rank_key(&self) -> SearchResultRankKey {
        SearchResultRankKey::from(self)
    }
}

/// 搜索结果排序键
///
/// 索引越小越靠前；没有索引的记录视为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchResultRankKey(usize);

impl SearchResultRankKey {
    pub fn index(self) -> usize {
        self.0
    }

    pub fn compare(a: &MetadataRecord, b: &MetadataRecord) -> Ordering {
        a.rank_key().cmp(&b.rank_key())
    }
}

impl From<&MetadataRecord> for SearchResultRankKey {
    fn from(record: &MetadataRecord) -> Self {
        Self(record.search_result_index.unwrap_or(0))
    }
}

/// 封面候选
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverCandidate {
    /// 由 id 推导的默认封面
    Default(String),
    /// 详情页上的自定义封面 (可能是作者空间低分辨率版本)
    Custom(String),
    None,
}

impl CoverCandidate {
    pub fn url(&self) -> Option<&str> {
        match self {
            CoverCandidate::Default(u) | CoverCandidate::Custom(u) => Some(u),
            CoverCandidate::None => None,
        }
    }
}

/// 查询条件
#[derive(Debug, Clone, Builder)]
pub struct LookupQuery {
    #[builder(into)]
    pub title: Option<String>,
    #[builder(default)]
    pub authors: Vec<String>,
    #[builder(default)]
    pub identifiers: Identifiers,
    /// 单次请求超时
    #[builder(default = Duration::from_secs(30))]
    pub timeout: Duration,
}
