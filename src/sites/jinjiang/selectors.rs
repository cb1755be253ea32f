//! 晋江选择器
//!
//! 预编译的 CSS 选择器，对应站点固定版本的页面结构

use std::sync::OnceLock;

use scraper::Selector;

/// 站点选择器集合
pub struct SiteSelectors {
    // 详情页
    pub title: Selector,
    pub author: Selector,
    pub intro: Selector,
    pub info_label: Selector,
    pub cover_img: Selector,
    pub chapter_row: Selector,
    pub chapter_click: Selector,
    // 站内搜索
    pub search_banner: Selector,
    pub result_card: Selector,
    pub card_link: Selector,
    pub card_title: Selector,
    pub card_date: Selector,
    pub card_author: Selector,
    pub card_intro: Selector,
    // 站内搜索降级后的通用搜索
    pub web_card: Selector,
    pub web_link: Selector,
    pub web_caption: Selector,
    pub web_snippet: Selector,
}

static SELECTORS: OnceLock<SiteSelectors> = OnceLock::new();

impl SiteSelectors {
    /// 获取全局选择器实例
    pub fn get() -> &'static SiteSelectors {
        SELECTORS.get_or_init(|| SiteSelectors {
            title: Selector::parse("span[itemprop='articleSection']").unwrap(),
            author: Selector::parse("span[itemprop='author']").unwrap(),
            intro: Selector::parse("div#novelintro").unwrap(),
            info_label: Selector::parse("div[class='smallreadbody'] > span").unwrap(),
            cover_img: Selector::parse("img[class='noveldefaultimage']").unwrap(),
            chapter_row: Selector::parse("table tr[itemprop*='chapter']").unwrap(),
            chapter_click: Selector::parse("td[class='chapterclick']").unwrap(),
            search_banner: Selector::parse("table[class='searchContainer'] div[class='nav']").unwrap(),
            result_card: Selector::parse("div#search_result > div:not([style]):not([class])").unwrap(),
            card_link: Selector::parse("h3[class='title'] > a").unwrap(),
            card_title: Selector::parse("h3[class='title'] span").unwrap(),
            card_date: Selector::parse("h3[class='title'] > font").unwrap(),
            card_author: Selector::parse("div[class='info'] > a > span").unwrap(),
            card_intro: Selector::parse("div[class='intro']").unwrap(),
            web_card: Selector::parse("ol#b_results > li[class='b_algo']").unwrap(),
            web_link: Selector::parse("h2 a").unwrap(),
            web_caption: Selector::parse("div.b_caption").unwrap(),
            web_snippet: Selector::parse("div.b_caption p").unwrap(),
        })
    }
}
