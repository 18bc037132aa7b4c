//! 識別子の正規化
//!
//! サービス名からスタックIDやテーブル名を生成します。

use crate::error::{FlowError, Result};
use regex::Regex;

/// QueueService スタックIDの接頭辞
pub const QUEUE_SERVICE_STACK_PREFIX: &str = "QueueService";

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| FlowError::InvalidConfig(format!("正規表現のコンパイルエラー: {}", e)))
}

/// 先頭文字を大文字にする
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 英数字以外で区切り、各単語の先頭を大文字にして連結する
///
/// `"queue-a"` → `"QueueA"`, `"my_queue"` → `"MyQueue"`
pub fn camel_case(text: &str) -> Result<String> {
    let separator = compile(r"[^a-zA-Z0-9]")?;
    Ok(separator.split(text).map(capitalize).collect())
}

/// テーブル名形式（小文字 + 非単語文字を `_` に置換）
pub fn format_table_name(topic: &str) -> Result<String> {
    let non_word = compile(r"\W")?;
    Ok(non_word.replace_all(&topic.to_lowercase(), "_").into_owned())
}

/// サービス名をスタック識別子に正規化
///
/// 正規化の結果が空になる名前（記号のみ等）はエラー
pub fn normalize_identifier(name: &str) -> Result<String> {
    let identifier = camel_case(name)?;
    if identifier.is_empty() {
        return Err(FlowError::InvalidServiceName(name.to_string()));
    }
    Ok(identifier)
}

/// QueueService スタックのIDを生成
pub fn queue_service_stack_id(handle: &str) -> String {
    format!("{}-{}", QUEUE_SERVICE_STACK_PREFIX, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_separators() {
        assert_eq!(camel_case("queue-a").unwrap(), "QueueA");
        assert_eq!(camel_case("my_queue").unwrap(), "MyQueue");
        assert_eq!(camel_case("orders.v2 events").unwrap(), "OrdersV2Events");
    }

    #[test]
    fn test_camel_case_keeps_inner_case() {
        // 先頭以外はそのまま
        assert_eq!(camel_case("dataLake").unwrap(), "DataLake");
        assert_eq!(camel_case("ABC").unwrap(), "ABC");
    }

    #[test]
    fn test_camel_case_drops_empty_parts() {
        assert_eq!(camel_case("--queue--a--").unwrap(), "QueueA");
        assert_eq!(camel_case("").unwrap(), "");
    }

    #[test]
    fn test_normalize_identifier_rejects_symbols_only() {
        let result = normalize_identifier("--_");
        assert!(matches!(result, Err(FlowError::InvalidServiceName(name)) if name == "--_"));
    }

    #[test]
    fn test_normalize_identifier_non_ascii_is_separator() {
        assert_eq!(normalize_identifier("キュー-a").unwrap(), "A");
        assert!(normalize_identifier("キュー").is_err());
    }

    #[test]
    fn test_format_table_name() {
        assert_eq!(format_table_name("Order Events-v1").unwrap(), "order_events_v1");
        assert_eq!(format_table_name("plain").unwrap(), "plain");
    }

    #[test]
    fn test_queue_service_stack_id() {
        assert_eq!(queue_service_stack_id("QueueA"), "QueueService-QueueA");
    }
}
