//! Message formatting utilities for client display.

use chrono::{DateTime, FixedOffset};
use hubbub_shared::time::to_local_clock_time;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the banner shown after connecting
    pub fn format_welcome(url: &str, username: Option<&str>) -> String {
        let who = match username {
            Some(name) => format!("You are '{}'.", name),
            None => "You joined as a guest.".to_string(),
        };
        format!(
            "\nConnected to {}. {} Type messages and press Enter to send. Press Ctrl+C to exit.\n",
            url, who
        )
    }

    /// Format a relayed text frame
    ///
    /// # Arguments
    ///
    /// * `text` - The frame payload exactly as received
    /// * `received_at` - When the frame arrived
    pub fn format_received(text: &str, received_at: &DateTime<FixedOffset>) -> String {
        format!("\n[{}] {}\n", to_local_clock_time(received_at), text)
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize, received_at: &DateTime<FixedOffset>) -> String {
        format!(
            "\n[{}] ← Received {} bytes of binary data\n",
            to_local_clock_time(received_at),
            byte_count
        )
    }

    /// Format a confirmation message after sending
    pub fn format_sent_confirmation(sent_at: &DateTime<FixedOffset>) -> String {
        format!("sent at {}\n", to_local_clock_time(sent_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn received_at() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2023-01-01T00:00:00+09:00").unwrap()
    }

    #[test]
    fn test_format_welcome_with_username() {
        // テスト項目: ユーザー名を指定した場合、名前が表示される
        // given (前提条件):
        let url = "ws://127.0.0.1:8181/room/1";

        // when (操作):
        let result = MessageFormatter::format_welcome(url, Some("alice"));

        // then (期待する結果):
        assert!(result.contains("ws://127.0.0.1:8181/room/1"));
        assert!(result.contains("You are 'alice'."));
    }

    #[test]
    fn test_format_welcome_as_guest() {
        // テスト項目: ユーザー名を指定しない場合、ゲストとして表示される
        // given (前提条件):
        let url = "ws://127.0.0.1:8181/room/1";

        // when (操作):
        let result = MessageFormatter::format_welcome(url, None);

        // then (期待する結果):
        assert!(result.contains("guest"));
    }

    #[test]
    fn test_format_received_keeps_payload_verbatim() {
        // テスト項目: 受信したフレームは加工されずに時刻付きで表示される
        // given (前提条件):
        let text = r#"{"x": "5", "y": 1}"#;

        // when (操作):
        let result = MessageFormatter::format_received(text, &received_at());

        // then (期待する結果):
        assert!(result.contains(text));
        assert!(result.contains('['));
        assert!(result.contains("] "));
    }

    #[test]
    fn test_format_binary_message() {
        // テスト項目: バイナリメッセージ通知が正しくフォーマットされる
        // given (前提条件):
        let byte_count = 1024;

        // when (操作):
        let result = MessageFormatter::format_binary_message(byte_count, &received_at());

        // then (期待する結果):
        assert!(result.contains("1024 bytes"));
        assert!(result.contains("Received"));
    }

    #[test]
    fn test_format_sent_confirmation() {
        // テスト項目: 送信確認メッセージが正しくフォーマットされる
        // given (前提条件):
        let sent_at = received_at();

        // when (操作):
        let result = MessageFormatter::format_sent_confirmation(&sent_at);

        // then (期待する結果):
        assert!(result.starts_with("sent at "));
        assert!(result.ends_with('\n'));
    }
}
