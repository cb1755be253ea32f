//! 晋江字段提取
//!
//! 详情页与搜索结果页的结构化字段读取。标题、作者等必需节点缺失时返回
//! `Extraction` 错误；标签、日期、自定义封面缺失只是正常的空值。

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::core::error::{Result, SourceError};
use crate::utils::to_absolute_url;

use super::SiteSelectors;
use super::urls::{catalog_base, id_from_url};

/// 标签行的标记文字
pub const TAG_MARKER: &str = "标签";

/// 章节首发时间的标记文字
pub const CHAPTER_DATE_MARKER: &str = "章节首发时间：";

static CHAPTER_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{}(\d{{4}}-\d{{2}}-\d{{2}})\s(\d{{2}}:\d{{2}}:\d{{2}})",
        regex::escape(CHAPTER_DATE_MARKER)
    ))
    .expect("valid regex")
});

static LISTING_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid regex"));

static RESULT_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"共找到\s*(\d+)\s*篇文章").expect("valid regex"));

/// 搜索引擎结果标题形如 `《书名》作者_【原创小说|纯爱小说】_晋江文学城`
static WEB_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"《(?P<title>[^》]+)》\s*(?P<author>[^_|《》\s]+)").expect("valid regex")
});

/// 详情页字段
#[derive(Debug, Clone, PartialEq)]
pub struct DetailFields {
    pub title: String,
    pub author: String,
    pub tags: Vec<String>,
    /// 文案区块的 HTML
    pub description: String,
    pub custom_cover: Option<String>,
    pub first_chapter_published: Option<NaiveDateTime>,
}

/// 搜索结果页版式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLayout {
    /// 站内搜索结果卡片
    Primary,
    /// 站内搜索无结果时降级到的通用搜索引擎结果
    Secondary,
}

/// 搜索结果卡片
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCard {
    /// 链接中解析出的书籍 id
    pub id: String,
    pub url: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub publish_date: Option<NaiveDate>,
}

/// 搜索结果页
///
/// 卡片按页面顺序逐张惰性提取，单张卡片的失败不影响其余卡片，也不改变后续卡片的名次。
#[derive(Debug)]
pub struct SearchPage<'a> {
    pub count: u32,
    pub layout: SearchLayout,
    doc: &'a Html,
}

impl<'a> SearchPage<'a> {
    pub fn cards(&self) -> impl Iterator<Item = Result<SearchCard>> + 'a {
        let s = SiteSelectors::get();
        let (selector, extract): (&'static Selector, fn(ElementRef<'a>) -> Result<SearchCard>) =
            match self.layout {
                SearchLayout::Primary => (&s.result_card, extract_primary_card),
                SearchLayout::Secondary => (&s.web_card, extract_web_card),
            };
        let doc: &'a Html = self.doc;
        doc.select(selector).map(extract)
    }
}

fn text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// 选择器命中的第一个非空文本
fn first_text(parent: &ElementRef, selector: &Selector) -> Option<String> {
    parent
        .select(selector)
        .next()
        .map(text_of)
        .filter(|s| !s.is_empty())
}

fn doc_text(doc: &Html, selector: &Selector) -> Option<String> {
    first_text(&doc.root_element(), selector)
}

fn outer_html(parent: &ElementRef, selector: &Selector) -> Option<String> {
    parent
        .select(selector)
        .next()
        .map(|el| el.html().trim().to_string())
}

// ============================================================================
// 详情页
// ============================================================================

pub fn extract_detail(doc: &Html) -> Result<DetailFields> {
    let s = SiteSelectors::get();

    let title = doc_text(doc, &s.title)
        .ok_or_else(|| SourceError::Extraction("title node not found on detail page".into()))?;
    let author = doc_text(doc, &s.author)
        .ok_or_else(|| SourceError::Extraction("author node not found on detail page".into()))?;

    let description = outer_html(&doc.root_element(), &s.intro).unwrap_or_else(|| {
        info!("详情页没有文案区块");
        String::new()
    });

    Ok(DetailFields {
        title,
        author,
        tags: extract_tags(doc),
        description,
        custom_cover: extract_custom_cover(doc),
        first_chapter_published: extract_first_chapter_date(doc),
    })
}

/// 标签：标记文字所在 `span` 之后的兄弟 `span` 中的链接文字
pub fn extract_tags(doc: &Html) -> Vec<String> {
    let s = SiteSelectors::get();

    let Some(label) = doc
        .select(&s.info_label)
        .find(|span| span.text().any(|t| t.contains(TAG_MARKER)))
    else {
        info!("详情页没有标签行");
        return Vec::new();
    };

    label
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "span")
        .flat_map(|span| {
            span.children()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == "a")
        })
        .map(text_of)
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn extract_custom_cover(doc: &Html) -> Option<String> {
    let s = SiteSelectors::get();
    let src = doc
        .select(&s.cover_img)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string);

    if src.is_none() {
        info!("详情页没有自定义封面");
    }
    src
}

/// 第一章的首发时间
///
/// 只有 `clickchapterid` 为 `"1"` 的免费章节带有可读的时间；
/// VIP 或锁定章节没有这个属性，此时不给出日期。
pub fn extract_first_chapter_date(doc: &Html) -> Option<NaiveDateTime> {
    let s = SiteSelectors::get();

    let Some(row) = doc.select(&s.chapter_row).next() else {
        info!("详情页没有章节列表");
        return None;
    };

    let chapter_id = row
        .select(&s.chapter_click)
        .next()
        .and_then(|td| td.value().attr("clickchapterid"));
    if chapter_id != Some("1") {
        info!(
            "first chapter's chapter id is {:?}, not \"1\"; no publish date",
            chapter_id
        );
        return None;
    }

    let combined = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .last()
        .and_then(|td| td.value().attr("title"))?;

    let date = parse_chapter_date(combined);
    match date {
        Some(d) => info!("found publish date: {}", d),
        None => info!("no publish date in first chapter: {}", combined),
    }
    date
}

pub fn parse_chapter_date(combined: &str) -> Option<NaiveDateTime> {
    let caps = CHAPTER_DATE.captures(combined)?;
    let stamp = format!("{} {}", &caps[1], &caps[2]);
    NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S").ok()
}

/// 列表中的日期，只精确到天
pub fn parse_listing_date(text: &str) -> Option<NaiveDate> {
    let found = LISTING_DATE.find(text)?;
    NaiveDate::parse_from_str(found.as_str(), "%Y-%m-%d").ok()
}

// ============================================================================
// 搜索结果页
// ============================================================================

/// 读取结果数横幅并按版式提取卡片
///
/// 横幅缺失或无法读出数量说明页面模板已变化，与“没有结果”区分开。
pub fn extract_search_page(doc: &Html) -> Result<SearchPage<'_>> {
    let s = SiteSelectors::get();

    let banner = doc
        .select(&s.search_banner)
        .next()
        .map(text_of)
        .ok_or_else(|| SourceError::Extraction("search result banner not found".into()))?;
    info!("detected books: {}", banner);

    let count = parse_result_count(&banner)?;

    let layout = if count == 0 {
        info!("no result from jinjiang search engine, reading web search results");
        SearchLayout::Secondary
    } else {
        info!("found {} books from jinjiang search engine", count);
        SearchLayout::Primary
    };

    Ok(SearchPage { count, layout, doc })
}

pub fn parse_result_count(banner: &str) -> Result<u32> {
    let caps = RESULT_COUNT
        .captures(banner)
        .ok_or_else(|| SourceError::Extraction(format!("can't parse search banner: {}", banner)))?;
    caps[1]
        .parse()
        .map_err(|e| SourceError::Extraction(format!("bad result count {:?}: {}", &caps[1], e)))
}

/// 卡片链接及其书籍 id
///
/// 链接不是详情页时只算可接受的缺失，不再读取标题与作者。
fn card_link(card: &ElementRef, selector: &Selector) -> Result<(String, String)> {
    let url = card
        .select(selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| to_absolute_url(catalog_base(), href))
        .ok_or_else(|| SourceError::Miss("result card has no book link".into()))?;

    let id = id_from_url(&url)
        .ok_or_else(|| SourceError::Miss(format!("can't find book id from url: {}", url)))?;
    Ok((id, url))
}

fn extract_primary_card(card: ElementRef<'_>) -> Result<SearchCard> {
    let s = SiteSelectors::get();

    let (id, url) = card_link(&card, &s.card_link)?;
    let title = first_text(&card, &s.card_title)
        .ok_or_else(|| SourceError::Extraction(format!("no title in result card: {}", url)))?;
    let author = first_text(&card, &s.card_author)
        .ok_or_else(|| SourceError::Extraction(format!("no author in result card: {}", url)))?;
    let publish_date = first_text(&card, &s.card_date).and_then(|t| parse_listing_date(&t));
    let description = outer_html(&card, &s.card_intro).unwrap_or_default();

    debug!("result card {} {} {}", url, title, author);
    Ok(SearchCard {
        id,
        url,
        title,
        author,
        description,
        publish_date,
    })
}

fn extract_web_card(card: ElementRef<'_>) -> Result<SearchCard> {
    let s = SiteSelectors::get();

    let (id, url) = card_link(&card, &s.web_link)?;
    let heading = first_text(&card, &s.web_link).unwrap_or_default();
    let caps = WEB_HEADING.captures(&heading).ok_or_else(|| {
        SourceError::Extraction(format!("can't read title/author from heading: {}", heading))
    })?;

    let publish_date = first_text(&card, &s.web_caption).and_then(|t| parse_listing_date(&t));
    let description = outer_html(&card, &s.web_snippet).unwrap_or_default();

    Ok(SearchCard {
        id,
        url,
        title: caps["title"].trim().to_string(),
        author: caps["author"].trim().to_string(),
        description,
        publish_date,
    })
}
