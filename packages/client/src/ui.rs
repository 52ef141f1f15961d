//! UI utilities for the client.

use std::io::Write;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

/// Prompt shown before each input line
pub fn prompt(username: Option<&str>) -> String {
    format!("{}> ", username.unwrap_or(""))
}

/// Redisplay the prompt after printing a message
pub fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    std::io::stdout().flush().ok();
}

/// Read stdin lines on a dedicated thread and forward the non-empty ones.
///
/// The returned channel closes on Ctrl+C, Ctrl+D or a readline failure. The
/// thread outlives reconnects, so one reader serves every session.
pub fn spawn_line_reader(prompt: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_shows_username() {
        // テスト項目: ユーザー名の有無に応じてプロンプトが変わる
        // given (前提条件):
        let username = Some("alice");

        // when (操作):
        let named = prompt(username);
        let anonymous = prompt(None);

        // then (期待する結果):
        assert_eq!(named, "alice> ");
        assert_eq!(anonymous, "> ");
    }
}
