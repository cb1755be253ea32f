//! 晋江 URL 模板
//!
//! 抓取地址可以通过站点配置改写；书籍 id 的识别规则始终绑定正式域名。

use std::sync::LazyLock;

use encoding_rs::GB18030;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};
use regex::Regex;
use url::Url;

use crate::core::config::SiteConfig;

/// 在 `identifiers` 中保存书籍 id 使用的键
pub const PROVIDER_ID: &str = "jinjiang";

pub const CATALOG_ORIGIN: &str = "https://www.jjwxc.net";
pub const IMAGE_ORIGIN: &str = "https://i9-static.jjwxc.net";

static BOOK_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r".jjwxc\.net/onebook\.php\?novelid=(\d+)").expect("valid regex")
});

static CATALOG_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse(CATALOG_ORIGIN).expect("valid catalog origin"));

/// 与站点搜索框提交时一致的转义集合
const QUERY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// 正式站点根地址，用于补全站内相对链接
pub fn catalog_base() -> &'static Url {
    &CATALOG_BASE
}

/// 正式详情页地址
pub fn book_url(id: &str) -> String {
    format!("{}/onebook.php?novelid={}", CATALOG_ORIGIN, id)
}

/// 从详情页 URL 中解析书籍 id
///
/// 必须恰好匹配一次，零次或多次都视为没有 id。
pub fn id_from_url(url: &str) -> Option<String> {
    let mut matches = BOOK_URL_PATTERN.captures_iter(url);
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first[1].to_string())
}

/// 搜索关键字按 GB18030 编码后再百分号转义
pub fn encode_query(text: &str) -> String {
    let (bytes, _, _) = GB18030.encode(text);
    percent_encode(&bytes, QUERY_ESCAPE).to_string()
}

/// 抓取用的 URL 集合
#[derive(Debug, Clone)]
pub struct CatalogUrls {
    base: String,
    image_base: String,
}

impl CatalogUrls {
    pub fn new(config: &SiteConfig) -> Self {
        let base = config.base_url.as_deref().unwrap_or(CATALOG_ORIGIN);
        let image_base = config.image_base_url.as_deref().unwrap_or(IMAGE_ORIGIN);
        Self {
            base: base.trim_end_matches('/').to_string(),
            image_base: image_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn detail_url(&self, id: &str) -> String {
        format!("{}/onebook.php?novelid={}", self.base, id)
    }

    /// `t=1` 只搜书名，`ord=novelsize` 按字数排序
    pub fn search_url(&self, title: &str) -> String {
        format!(
            "{}/search.php?kw={}&ord=novelsize&t=1",
            self.base,
            encode_query(title)
        )
    }

    pub fn default_cover_url(&self, id: &str) -> String {
        format!("{}/novelimage.php?novelid={}", self.image_base, id)
    }
}

impl Default for CatalogUrls {
    fn default() -> Self {
        Self::new(&SiteConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_use_canonical_hosts() {
        let urls = CatalogUrls::default();
        assert_eq!(
            urls.detail_url("3146241"),
            "https://www.jjwxc.net/onebook.php?novelid=3146241"
        );
        assert_eq!(
            urls.default_cover_url("3146241"),
            "https://i9-static.jjwxc.net/novelimage.php?novelid=3146241"
        );
        assert_eq!(book_url("42"), "https://www.jjwxc.net/onebook.php?novelid=42");
    }

    #[test]
    fn search_url_is_gb18030_encoded() {
        let urls = CatalogUrls::default();
        assert_eq!(
            urls.search_url("天官赐福"),
            "https://www.jjwxc.net/search.php?kw=%CC%EC%B9%D9%B4%CD%B8%A3&ord=novelsize&t=1"
        );
        assert_eq!(
            urls.search_url(""),
            "https://www.jjwxc.net/search.php?kw=&ord=novelsize&t=1"
        );
        assert_eq!(encode_query("a b/c~"), "a%20b/c~");
    }

    #[test]
    fn configured_base_is_trimmed() {
        let cfg = SiteConfig::builder()
            .base_url("http://127.0.0.1:9000/")
            .image_base_url("http://127.0.0.1:9001")
            .build();
        let urls = CatalogUrls::new(&cfg);
        assert_eq!(
            urls.detail_url("1"),
            "http://127.0.0.1:9000/onebook.php?novelid=1"
        );
        assert_eq!(
            urls.default_cover_url("1"),
            "http://127.0.0.1:9001/novelimage.php?novelid=1"
        );
    }

    #[test]
    fn id_requires_exactly_one_match() {
        assert_eq!(
            id_from_url("https://www.jjwxc.net/onebook.php?novelid=3146241").as_deref(),
            Some("3146241")
        );
        assert_eq!(
            id_from_url("http://my.jjwxc.net/onebook.php?novelid=7&chapterid=2").as_deref(),
            Some("7")
        );
        assert_eq!(id_from_url("https://www.jjwxc.net/oneauthor.php?authorid=1"), None);
        assert_eq!(
            id_from_url(
                "https://www.jjwxc.net/onebook.php?novelid=1#https://www.jjwxc.net/onebook.php?novelid=2"
            ),
            None
        );
    }
}
