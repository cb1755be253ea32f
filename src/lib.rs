//! 晋江文学城元数据源
//!
//! 按书籍 id 或书名从晋江文学城获取书名、作者、文案、标签、首发日期与封面。

pub mod core;
pub mod interfaces;
pub mod network;
pub mod sites;
pub mod utils;

pub use crate::core::config::AppConfig;
pub use crate::core::error::{ErrorKind, Result, SourceError};
pub use crate::core::event::{ResultReceiver, ResultSender, SourceEvent, create_result_channel};
pub use crate::core::model::{LookupQuery, MetadataRecord, SearchResultRankKey};
pub use crate::interfaces::{Fetcher, MetadataSource};
pub use crate::network::HttpFetcher;
pub use crate::sites::SourceRegistry;
pub use crate::sites::jinjiang::Jinjiang;
