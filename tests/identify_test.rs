mod common;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jinjiang::{MetadataRecord, MetadataSource, create_result_channel};

use common::*;

async fn identify(server: &MockServer, query: &jinjiang::LookupQuery) -> (usize, Vec<MetadataRecord>) {
    let source = source_for(server);
    let (tx, rx) = create_result_channel();
    let count = source.identify(query, &tx, &CancellationToken::new()).await;
    drop(tx);
    (count, rx.drain_metadata())
}

fn date(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|day| day.and_hms_opt(h, min, s))
        .unwrap()
}

#[tokio::test]
async fn identify_by_id_reads_detail_page() {
    let server = MockServer::start().await;
    let cover = "//i9-static.jjwxc.net/tmp/backend/authorspace/s1/cover_300_420.jpg";
    mount_detail(&server, "3146241", &detail_page(cover, "1")).await;

    let (count, records) = identify(&server, &id_query("3146241")).await;

    assert_eq!(count, 1);
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.title, "我五行缺你");
    assert_eq!(record.authors, vec!["西子绪"]);
    assert_eq!(record.identifier("jinjiang"), Some("3146241"));
    assert_eq!(record.tags, vec!["灵异神怪", "甜文"]);
    assert_eq!(record.publisher, "晋江文学城");
    assert_eq!(record.language, "zh_CN");
    assert_eq!(record.url, "https://www.jjwxc.net/onebook.php?novelid=3146241");
    assert_eq!(record.pubdate, Some(date(2017, 5, 1, 20, 15, 30)));
    assert!(record.comments.contains("江蓠从小五行缺你。"));
    assert_eq!(record.cover.as_deref(), Some(cover));
    assert_eq!(record.search_result_index, None);
}

#[tokio::test]
async fn author_space_cover_is_upgraded_to_original() {
    let server = MockServer::start().await;
    let cover = "https://authorspace.jjwxc.net/upload/2021/cover_300_420.png";
    mount_detail(&server, "3146241", &detail_page(cover, "1")).await;

    let (_, records) = identify(&server, &id_query("3146241")).await;

    assert_eq!(
        records[0].cover.as_deref(),
        Some("https://authorspace.jjwxc.net/upload/2021/cover.png")
    );
}

#[tokio::test]
async fn missing_custom_cover_falls_back_to_default() {
    let server = MockServer::start().await;
    mount_detail(&server, "3146241", &detail_page("", "1")).await;

    let (_, records) = identify(&server, &id_query("3146241")).await;

    let expected = format!("{}/novelimage.php?novelid=3146241", server.uri());
    assert_eq!(records[0].cover.as_deref(), Some(expected.as_str()));
}

#[tokio::test]
async fn locked_first_chapter_has_no_pubdate() {
    let server = MockServer::start().await;
    mount_detail(&server, "3146241", &detail_page("", "")).await;

    let (count, records) = identify(&server, &id_query("3146241")).await;

    assert_eq!(count, 1);
    assert_eq!(records[0].pubdate, None);
    assert_eq!(records[0].title, "我五行缺你");
}

#[tokio::test]
async fn detail_page_without_author_yields_nothing() {
    let server = MockServer::start().await;
    let page = detail_page("", "1").replace("itemprop=\"author\"", "itemprop=\"creator\"");
    mount_detail(&server, "3146241", &page).await;

    let (count, records) = identify(&server, &id_query("3146241")).await;

    assert_eq!(count, 0);
    assert!(records.is_empty());
}

#[tokio::test]
async fn server_error_yields_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/onebook.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (count, records) = identify(&server, &id_query("3146241")).await;

    assert_eq!(count, 0);
    assert!(records.is_empty());
}

#[tokio::test]
async fn title_search_emits_ranked_results() {
    let server = MockServer::start().await;
    let page = SEARCH_PRIMARY.replace(
        "{{SECOND_LINK}}",
        "https://www.jjwxc.net/onebook.php?novelid=3300001",
    );
    mount_search(&server, &page).await;

    let (count, records) = identify(&server, &title_query("天官赐福")).await;

    assert_eq!(count, 3);
    let indices: Vec<_> = records.iter().map(|r| r.search_result_index).collect();
    assert_eq!(indices, vec![Some(0), Some(1), Some(2)]);

    let first = &records[0];
    assert_eq!(first.title, "天官赐福");
    assert_eq!(first.authors, vec!["墨香铜臭"]);
    assert_eq!(first.identifier("jinjiang"), Some("3200611"));
    assert_eq!(first.url, "http://www.jjwxc.net/onebook.php?novelid=3200611");
    assert_eq!(first.pubdate, Some(date(2017, 6, 30, 0, 0, 0)));
    assert_eq!(
        first.cover,
        Some(format!("{}/novelimage.php?novelid=3200611", server.uri()))
    );
    assert!(first.comments.contains("太子殿下"));

    let third = &records[2];
    assert_eq!(third.identifier("jinjiang"), Some("4000003"));
    assert_eq!(third.url, "https://www.jjwxc.net/onebook.php?novelid=4000003");
}

#[tokio::test]
async fn skipped_card_keeps_its_rank() {
    let server = MockServer::start().await;
    let page = SEARCH_PRIMARY.replace("{{SECOND_LINK}}", "https://www.example.com/book/9");
    mount_search(&server, &page).await;

    let (count, records) = identify(&server, &title_query("天官赐福")).await;

    assert_eq!(count, 2);
    let indices: Vec<_> = records.iter().map(|r| r.search_result_index).collect();
    assert_eq!(indices, vec![Some(0), Some(2)]);
}

#[tokio::test]
async fn ranking_follows_page_order() {
    let server = MockServer::start().await;
    let page = SEARCH_PRIMARY.replace(
        "{{SECOND_LINK}}",
        "https://www.jjwxc.net/onebook.php?novelid=3300001",
    );
    mount_search(&server, &page).await;

    let query = title_query("天官赐福");
    let (_, mut records) = identify(&server, &query).await;
    records.reverse();

    let source = source_for(&server);
    records.sort_by_key(source.identify_results_keygen(&query));

    let ids: Vec<_> = records.iter().filter_map(|r| r.identifier("jinjiang")).collect();
    assert_eq!(ids, vec!["3200611", "3300001", "4000003"]);
}

#[tokio::test]
async fn empty_site_search_reads_web_results() {
    let server = MockServer::start().await;
    mount_search(&server, SEARCH_WEB).await;

    let (count, records) = identify(&server, &title_query("岁月间")).await;

    assert_eq!(count, 1);
    let record = &records[0];
    assert_eq!(record.title, "岁月间");
    assert_eq!(record.authors, vec!["静水边"]);
    assert_eq!(record.identifier("jinjiang"), Some("2374843"));
    assert_eq!(record.search_result_index, Some(0));
    assert_eq!(record.pubdate, Some(date(2015, 3, 4, 0, 0, 0)));
}

#[tokio::test]
async fn missing_banner_yields_nothing() {
    let server = MockServer::start().await;
    mount_search(&server, "<html><body><div id=\"search_result\"></div></body></html>").await;

    let (count, records) = identify(&server, &title_query("天官赐福")).await;

    assert_eq!(count, 0);
    assert!(records.is_empty());
}

#[tokio::test]
async fn empty_title_still_searches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .and(query_param("kw", ""))
        .and(query_param("t", "1"))
        .respond_with(gb_page(SEARCH_WEB))
        .expect(1)
        .mount(&server)
        .await;

    let query = jinjiang::LookupQuery::builder().build();
    identify(&server, &query).await;
}
