//! 错误处理体系 (Error Handling System)
//!
//! 定义元数据源相关的错误类型、错误分级以及全局 Result 别名。

use reqwest::StatusCode;
use strum::Display;
use thiserror::Error;

/// 错误分级
///
/// 决定日志级别：`SoftMiss` 只记录信息，其余一律按错误记录。
/// 无论哪一级，都只终止当前分支，不会抛出到入口之外。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    /// 网络、超时、HTTP 状态错误
    Transport,
    /// 字节流无法构建为文档树
    Parse,
    /// 必需节点缺失 (标题、作者、搜索结果横幅等)
    Extraction,
    /// 可接受的缺失 (标签、日期、自定义封面、无法识别的结果链接)
    SoftMiss,
    /// 配置加载失败
    Config,
}

/// 全局错误定义
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Not found: {0}")]
    Miss(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 全局 Result 别名
pub type Result<T> = std::result::Result<T, SourceError>;

impl SourceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SourceError::Network(_) | SourceError::Status { .. } | SourceError::Io(_) => {
                ErrorKind::Transport
            }
            SourceError::Parse(_) => ErrorKind::Parse,
            SourceError::Extraction(_) => ErrorKind::Extraction,
            SourceError::Miss(_) => ErrorKind::SoftMiss,
            SourceError::Config(_) => ErrorKind::Config,
        }
    }

    /// 按错误分级写日志
    pub fn report(&self, context: &str) {
        match self.kind() {
            ErrorKind::SoftMiss => tracing::info!("{}: {}", context, self),
            kind => tracing::error!(kind = %kind, "{}: {}", context, self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_taxonomy() {
        assert_eq!(SourceError::Parse("x".into()).kind(), ErrorKind::Parse);
        assert_eq!(
            SourceError::Extraction("title".into()).kind(),
            ErrorKind::Extraction
        );
        assert_eq!(SourceError::Miss("tags".into()).kind(), ErrorKind::SoftMiss);
        let status = SourceError::Status {
            status: StatusCode::FORBIDDEN,
            url: "https://www.jjwxc.net/".into(),
        };
        assert_eq!(status.kind(), ErrorKind::Transport);
    }

    #[test]
    fn kind_display_names() {
        assert_eq!(ErrorKind::SoftMiss.to_string(), "SoftMiss");
        assert_eq!(ErrorKind::Transport.to_string(), "Transport");
    }
}
