//! 封面地址策略
//!
//! 作者空间 (authorspace) 上传的封面默认给出 `_300_420` 缩略版本，
//! 去掉该后缀即为原图。识别流程与封面下载共用同一条后缀规则。

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use url::{Position, Url};

use crate::core::model::CoverCandidate;
use crate::utils::to_absolute_url;

use super::urls::{CatalogUrls, catalog_base};

const AUTHOR_SPACE_MARKER: &str = "authorspace";

static RESOLUTION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_300_420(\.\w+)$").expect("valid regex"));

/// 去掉扩展名前的缩略尺寸后缀
pub fn strip_resolution_suffix(path: &str) -> Cow<'_, str> {
    RESOLUTION_SUFFIX.replace(path, "$1")
}

/// 解析页面上的封面地址，协议相对地址按正式站点补全
pub fn parse_cover_src(src: &str) -> Option<Url> {
    Url::parse(&to_absolute_url(catalog_base(), src)).ok()
}

/// 页面给出的封面地址原样使用，只为协议相对与站内相对地址补全前缀
pub fn custom_cover_fetch_url(src: &str) -> String {
    to_absolute_url(catalog_base(), src)
}

pub fn is_author_space_host(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|host| host.contains(AUTHOR_SPACE_MARKER))
}

pub fn is_author_space_path(url: &Url) -> bool {
    url.path().contains(AUTHOR_SPACE_MARKER)
}

/// 原图地址：保留协议与主机，去掉路径中的尺寸后缀 (查询串一并丢弃)
pub fn original_resolution_url(url: &Url) -> String {
    format!(
        "{}{}",
        &url[..Position::BeforePath],
        strip_resolution_suffix(url.path())
    )
}

/// 为识别结果选择封面
///
/// 有自定义封面时优先使用，作者空间主机上的换成原图；否则回退到按 id 推导的默认封面。
pub fn resolve_cover(custom_src: Option<&str>, catalog_id: &str, urls: &CatalogUrls) -> CoverCandidate {
    match custom_src.map(str::trim).filter(|src| !src.is_empty()) {
        Some(src) => match parse_cover_src(src) {
            Some(url) if is_author_space_host(&url) => {
                CoverCandidate::Custom(original_resolution_url(&url))
            }
            _ => CoverCandidate::Custom(src.to_string()),
        },
        None => CoverCandidate::Default(urls.default_cover_url(catalog_id)),
    }
}

pub fn resolve_cover_url(custom_src: Option<&str>, catalog_id: &str, urls: &CatalogUrls) -> String {
    resolve_cover(custom_src, catalog_id, urls)
        .url()
        .map(str::to_string)
        .unwrap_or_default()
}
