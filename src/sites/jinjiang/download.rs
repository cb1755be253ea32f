//! 晋江封面下载
//!
//! 先取按 id 推导的默认封面，再从详情页找自定义封面。
//! 每次取图前固定等待一段时间，避免触发站点的防刷限制；失败不重试。

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::error::Result;
use crate::core::event::{ResultSender, create_result_channel};
use crate::core::model::{CoverCandidate, LookupQuery};
use crate::interfaces::MetadataSource;

use super::cover::{
    custom_cover_fetch_url, is_author_space_path, original_resolution_url, parse_cover_src,
};
use super::extract::extract_custom_cover;
use super::urls::PROVIDER_ID;
use super::{INFO, Jinjiang};

impl Jinjiang {
    pub(super) async fn download_covers(
        &self,
        query: &LookupQuery,
        get_best_cover: bool,
        results: &ResultSender,
        abort: &CancellationToken,
    ) -> usize {
        // 所有可用封面都会尝试，不区分 best
        debug!(get_best_cover, "downloading all available covers");

        let id = match Self::known_id(&query.identifiers) {
            Some(id) => id.to_string(),
            None => match self.resolve_id(query, abort).await {
                Some(id) => id,
                None => return 0,
            },
        };

        let mut emitted = 0;

        let default_cover = CoverCandidate::Default(self.urls.default_cover_url(&id));
        if let Some(url) = default_cover.url() {
            info!("Downloading default cover from: {}", url);
            emitted += self
                .try_fetch_cover(url, query.timeout, results, "Failed to download default cover")
                .await;
        }

        let detail_url = self.urls.detail_url(&id);
        let custom_cover = match self
            .fetch_document(&detail_url, query.timeout, |doc| Ok(extract_custom_cover(doc)))
            .await
        {
            Ok(Some(src)) => CoverCandidate::Custom(src),
            Ok(None) => CoverCandidate::None,
            Err(e) => {
                e.report("can't load detail page for custom cover");
                return emitted;
            }
        };

        match custom_cover {
            CoverCandidate::Custom(src) => {
                emitted += self.download_custom_cover(&src, query.timeout, results).await;
            }
            _ => info!("no custom cover for book {}", id),
        }

        emitted
    }

    /// 未知 id 时先按书名识别，取排名第一的结果
    async fn resolve_id(&self, query: &LookupQuery, abort: &CancellationToken) -> Option<String> {
        info!("No id found, running identify");

        let (tx, rx) = create_result_channel();
        self.identify(query, &tx, abort).await;
        drop(tx);

        if abort.is_cancelled() {
            info!("aborted after identify");
            return None;
        }

        let mut records = rx.drain_metadata();
        if records.is_empty() {
            info!("no result after running identify");
            return None;
        }

        records.sort_by_key(self.identify_results_keygen(query));
        let id = records
            .first()
            .and_then(|record| record.identifier(PROVIDER_ID))
            .map(str::to_string);
        if id.is_none() {
            info!("No id found after running identify");
        }
        id
    }

    /// 作者空间封面先尝试原图，失败再退回页面给出的缩略图
    async fn download_custom_cover(
        &self,
        src: &str,
        timeout: Duration,
        results: &ResultSender,
    ) -> usize {
        let low_res = custom_cover_fetch_url(src);
        let low_res = low_res.as_str();
        let parsed = parse_cover_src(src);

        match parsed.as_ref().filter(|url| is_author_space_path(url)) {
            Some(url) => {
                let original = original_resolution_url(url);
                info!("Downloading authorspace 'original' custom cover from: {}", original);
                match self.fetch_cover(&original, timeout, results).await {
                    Ok(n) => n,
                    Err(e) => {
                        e.report("Failed to download 'original' authorspace custom cover");
                        info!("Downloading authorspace low-res custom cover from: {}", low_res);
                        self.try_fetch_cover(
                            low_res,
                            timeout,
                            results,
                            "Failed to download low-res authorspace custom cover",
                        )
                        .await
                    }
                }
            }
            None => {
                info!("Downloading custom cover from: {}", low_res);
                self.try_fetch_cover(low_res, timeout, results, "Failed to download custom cover")
                    .await
            }
        }
    }

    async fn try_fetch_cover(
        &self,
        url: &str,
        timeout: Duration,
        results: &ResultSender,
        context: &str,
    ) -> usize {
        self.fetch_cover(url, timeout, results)
            .await
            .unwrap_or_else(|e| {
                e.report(&format!("{} from {}", context, url));
                0
            })
    }

    /// 间隔后取图，非空才投递
    async fn fetch_cover(&self, url: &str, timeout: Duration, results: &ResultSender) -> Result<usize> {
        tokio::time::sleep(self.pacing).await;
        let data = self.fetcher.fetch(url, timeout).await?;
        if data.is_empty() {
            info!("empty cover from {}", url);
            return Ok(0);
        }
        results.cover(INFO.name, data);
        Ok(1)
    }
}
