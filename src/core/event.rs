//! 结果通道
//!
//! 元数据源与宿主之间的唯一交付链路：识别流程投递元数据记录，封面流程投递图片字节。

use bytes::Bytes;
use flume::{Receiver, Sender};

use crate::core::model::MetadataRecord;

/// 元数据源产出的结果
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// 一条元数据记录
    Metadata(Box<MetadataRecord>),
    /// 封面图片原始字节
    Cover { source: String, data: Bytes },
}

/// 结果发送器
#[derive(Clone)]
pub struct ResultSender {
    tx: Sender<SourceEvent>,
}

impl ResultSender {
    pub fn new(tx: Sender<SourceEvent>) -> Self {
        Self { tx }
    }

    /// 发送事件 (接收端关闭时静默丢弃)
    pub fn emit(&self, event: SourceEvent) {
        let _ = self.tx.send(event);
    }

    pub fn metadata(&self, record: MetadataRecord) {
        self.emit(SourceEvent::Metadata(Box::new(record)));
    }

    pub fn cover(&self, source: &str, data: Bytes) {
        self.emit(SourceEvent::Cover {
            source: source.to_string(),
            data,
        });
    }
}

/// 结果接收器
pub struct ResultReceiver {
    rx: Receiver<SourceEvent>,
}

impl ResultReceiver {
    pub fn new(rx: Receiver<SourceEvent>) -> Self {
        Self { rx }
    }

    /// 异步接收事件
    pub async fn recv_async(&self) -> Option<SourceEvent> {
        self.rx.recv_async().await.ok()
    }

    /// 取出当前已入队的全部事件
    pub fn drain(&self) -> Vec<SourceEvent> {
        self.rx.drain().collect()
    }

    /// 取出当前已入队的元数据记录，忽略其他事件
    pub fn drain_metadata(&self) -> Vec<MetadataRecord> {
        self.drain()
            .into_iter()
            .filter_map(|event| match event {
                SourceEvent::Metadata(record) => Some(*record),
                SourceEvent::Cover { .. } => None,
            })
            .collect()
    }

    /// 取出当前已入队的封面
    pub fn drain_covers(&self) -> Vec<(String, Bytes)> {
        self.drain()
            .into_iter()
            .filter_map(|event| match event {
                SourceEvent::Cover { source, data } => Some((source, data)),
                SourceEvent::Metadata(_) => None,
            })
            .collect()
    }
}

/// 创建结果通道
pub fn create_result_channel() -> (ResultSender, ResultReceiver) {
    let (tx, rx) = flume::unbounded();
    (ResultSender::new(tx), ResultReceiver::new(rx))
}
