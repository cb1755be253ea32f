#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use jinjiang::core::config::{NetworkConfig, SiteConfig};
use jinjiang::core::model::{Identifiers, LookupQuery};
use jinjiang::sites::jinjiang::PROVIDER_ID;
use jinjiang::{Fetcher, HttpFetcher, Jinjiang};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DETAIL_PAGE: &str = include_str!("../fixtures/detail.html");
pub const SEARCH_PRIMARY: &str = include_str!("../fixtures/search_primary.html");
pub const SEARCH_WEB: &str = include_str!("../fixtures/search_web.html");

pub fn test_network() -> NetworkConfig {
    NetworkConfig::builder().pacing_ms(0).timeout_secs(5).build()
}

/// 抓取与封面都指向本地模拟服务器的数据源
pub fn source_for(server: &MockServer) -> Jinjiang {
    let fetcher = HttpFetcher::new(&test_network()).unwrap();
    source_with(server, Arc::new(fetcher))
}

pub fn source_with(server: &MockServer, fetcher: Arc<dyn Fetcher>) -> Jinjiang {
    let site = SiteConfig::builder()
        .base_url(server.uri())
        .image_base_url(server.uri())
        .build();
    Jinjiang::new(site, &test_network(), fetcher)
}

/// 站点页面按 GB18030 编码发送
pub fn gb_page(html: &str) -> ResponseTemplate {
    let (bytes, _, _) = encoding_rs::GB18030.encode(html);
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=gb2312")
        .set_body_bytes(bytes.into_owned())
}

pub fn image(data: &'static [u8]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "image/jpeg")
        .set_body_bytes(data)
}

pub fn detail_page(cover: &str, chapter_id: &str) -> String {
    DETAIL_PAGE
        .replace("{{COVER}}", cover)
        .replace("{{CHAPTER_ID}}", chapter_id)
}

pub async fn mount_detail(server: &MockServer, id: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path("/onebook.php"))
        .and(query_param("novelid", id))
        .respond_with(gb_page(html))
        .mount(server)
        .await;
}

pub async fn mount_search(server: &MockServer, html: &str) {
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .and(query_param("t", "1"))
        .respond_with(gb_page(html))
        .mount(server)
        .await;
}

pub fn id_query(id: &str) -> LookupQuery {
    let mut identifiers = Identifiers::new();
    identifiers.insert(PROVIDER_ID.to_string(), id.to_string());
    LookupQuery::builder()
        .identifiers(identifiers)
        .timeout(Duration::from_secs(5))
        .build()
}

pub fn title_query(title: &str) -> LookupQuery {
    LookupQuery::builder()
        .title(title)
        .timeout(Duration::from_secs(5))
        .build()
}
