//! 文本抽取 - 业务能力层
//!
//! 抽取失败不会向上抛错，只会退化为空文本：空答卷照样参与评分。

use std::path::Path;
use tracing::warn;

/// 从文档字节中抽取纯文本
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> String;
}

/// 纯文本抽取器
///
/// 适用于 `.txt` / `.md` 文档：按 UTF-8 解码并去掉 NUL 字符。
/// 不是合法 UTF-8 的内容（如 PDF 等二进制文档）按空文本处理。
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> String {
        match std::str::from_utf8(bytes) {
            Ok(text) => text.replace('\0', ""),
            Err(e) => {
                warn!("⚠️ 文档不是 UTF-8 文本 ({})，按空文本处理", e);
                String::new()
            }
        }
    }
}

/// 读取文件并抽取文本，读取失败时返回空字符串
pub async fn extract_file(extractor: &dyn TextExtractor, path: &Path) -> String {
    match tokio::fs::read(path).await {
        Ok(bytes) => extractor.extract_text(&bytes),
        Err(e) => {
            warn!("⚠️ 无法读取文档 {}: {}，按空文本处理", path.display(), e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let extractor = PlainTextExtractor;
        assert_eq!(extractor.extract_text(b"1) A\n2) C"), "1) A\n2) C");
        assert_eq!(extractor.extract_text(b"ok\0done"), "okdone");
        assert_eq!(extractor.extract_text(b""), "");
    }

    #[test]
    fn test_binary_document_degrades_to_empty() {
        let extractor = PlainTextExtractor;
        assert_eq!(extractor.extract_text(b"%PDF-1.7\n\xe2\xe3\xcf\xd3\n"), "");
        assert_eq!(extractor.extract_text(b"ok\0\xff"), "");
    }

    #[tokio::test]
    async fn test_missing_file_degrades_to_empty() {
        let text = extract_file(&PlainTextExtractor, Path::new("/no/such/answer.txt")).await;
        assert!(text.is_empty());
    }
}
