//! 页面预处理
//!
//! 原始字节 -> 字符集识别与解码 -> 清理非法控制字符 -> 文档树。
//! 站点页面声明为 GB2312/GBK，实际按 GB18030 解码才不会丢字。

use std::borrow::Cow;
use std::sync::LazyLock;

use encoding_rs::{Encoding, GB18030, UTF_8};
use regex::Regex;
use regex::bytes::Regex as BytesRegex;
use scraper::Html;
use tracing::debug;

use crate::core::error::{Result, SourceError};

/// 只在文档头部寻找字符集声明
const SNIFF_LIMIT: usize = 2048;

static CHARSET_DECL: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r#"(?i)(?:charset|encoding)\s*=\s*["']?\s*([a-z0-9_\-:.]+)"#)
        .expect("valid regex")
});

static XML_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*<\?xml[^>]*\?>").expect("valid regex"));

/// 识别字符集
///
/// 优先级：BOM > 文档头部声明 > 合法 UTF-8 > GB18030。
pub fn detect_encoding(raw: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(raw) {
        return encoding;
    }

    let head = &raw[..raw.len().min(SNIFF_LIMIT)];
    let declared = CHARSET_DECL
        .captures(head)
        .and_then(|caps| Encoding::for_label(&caps[1]));

    match declared {
        // 站点的 gb2312/gbk 声明统一按超集 GB18030 解码
        Some(enc) if enc == encoding_rs::GBK => GB18030,
        Some(enc) => enc,
        None if std::str::from_utf8(raw).is_ok() => UTF_8,
        None => GB18030,
    }
}

/// 删除文本中不允许出现的 ASCII 控制字符 (保留 `\t` `\n` `\r`)
pub fn clean_ascii_chars(text: &str) -> Cow<'_, str> {
    let illegal = |c: char| matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{7f}');
    if text.chars().any(illegal) {
        Cow::Owned(text.chars().filter(|c| !illegal(*c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// 将原始字节解码为干净的文本
pub fn decode(raw: &[u8]) -> Result<String> {
    let raw = raw.trim_ascii();
    if raw.is_empty() {
        return Err(SourceError::Parse("empty document".into()));
    }

    let encoding = detect_encoding(raw);
    let (text, used, had_errors) = encoding.decode(raw);
    if had_errors {
        debug!("页面含有 {} 无法解码的字节，已替换", used.name());
    }

    let text = XML_DECL.replace(&text, "");
    let text = clean_ascii_chars(&text);
    if !text.contains('<') {
        return Err(SourceError::Parse(format!(
            "not a markup document ({} bytes, {})",
            raw.len(),
            used.name()
        )));
    }

    Ok(text.into_owned())
}

/// 构建可查询的文档树，HTML 实体由解析器处理
pub fn normalize(raw: &[u8]) -> Result<Html> {
    let text = decode(raw)?;
    Ok(Html::parse_document(&text))
}
