//! 晋江识别流程
//!
//! 两种互斥模式：已知 id 时只抓一次详情页、至多产出一条记录；
//! 否则按书名搜索，按页面顺序逐条产出并标注名次。

use tracing::info;

use crate::core::error::Result;
use crate::core::event::ResultSender;
use crate::core::model::{LookupQuery, MetadataRecord};

use super::cover::resolve_cover_url;
use super::extract::{self, DetailFields, SearchPage};
use super::Jinjiang;

impl Jinjiang {
    pub(super) async fn identify_by_id(
        &self,
        id: &str,
        query: &LookupQuery,
        results: &ResultSender,
    ) -> Result<usize> {
        let url = self.urls.detail_url(id);
        info!("identify with jinjiang id ({}) from url: {}", id, url);

        let record = self
            .fetch_document(&url, query.timeout, |doc| {
                extract::extract_detail(doc).map(|fields| self.detail_record(id, fields))
            })
            .await?;

        results.metadata(record);
        Ok(1)
    }

    pub(super) async fn identify_by_search(
        &self,
        query: &LookupQuery,
        results: &ResultSender,
    ) -> Result<usize> {
        // 空书名同样发起请求，站点会返回默认列表
        let title = query.title.as_deref().unwrap_or("");
        let url = self.urls.search_url(title);
        info!("identify with title ({}) from url: {}", title, url);
        if !query.authors.is_empty() {
            info!("authors {:?} are not used by title search", query.authors);
        }

        self.fetch_document(&url, query.timeout, |doc| {
            extract::extract_search_page(doc).map(|page| self.emit_search_results(page, results))
        })
        .await
    }

    fn detail_record(&self, id: &str, fields: DetailFields) -> MetadataRecord {
        let cover = resolve_cover_url(fields.custom_cover.as_deref(), id, &self.urls);
        info!("cover url: {}", cover);

        let mut record = Self::base_record(fields.title, fields.author, id);
        record.comments = fields.description;
        record.tags = fields.tags;
        record.cover = Some(cover);
        record.pubdate = fields.first_chapter_published;
        record
    }

    /// 逐张卡片提取并立即产出记录
    ///
    /// 被跳过的卡片同样占用名次，名次始终对应页面上的位置。
    fn emit_search_results(&self, page: SearchPage<'_>, results: &ResultSender) -> usize {
        let mut emitted = 0;

        for (index, card) in page.cards().enumerate() {
            let card = match card {
                Ok(card) => card,
                Err(e) => {
                    e.report(&format!("[{}] skipped search result", index));
                    continue;
                }
            };

            info!(
                "[{}] id ({}) title ({}) author ({}) publish date ({:?})",
                index, card.id, card.title, card.author, card.publish_date
            );

            let mut record = Self::base_record(card.title, card.author, &card.id);
            record.comments = card.description;
            record.url = card.url;
            record.cover = Some(self.urls.default_cover_url(&card.id));
            record.pubdate = card.publish_date.and_then(|d| d.and_hms_opt(0, 0, 0));
            record.search_result_index = Some(index);

            results.metadata(record);
            emitted += 1;
        }

        info!("{} of {} books on first page emitted", emitted, page.count);
        emitted
    }
}
