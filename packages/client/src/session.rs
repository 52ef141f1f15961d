//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use hubbub_shared::time::Clock;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, protocol::Message},
};

use crate::{
    error::ClientError,
    formatter::MessageFormatter,
    message::{chat_frame, create_frame},
    ui::{prompt, redisplay_prompt},
};

/// Run one connection to the room until it drops or the input closes.
///
/// Returns `Ok(())` when the user ends input (Ctrl+C / Ctrl+D), and an error
/// when the connection could not be made or was lost.
pub async fn run_client_session(
    url: &str,
    username: Option<&str>,
    input: &mut mpsc::UnboundedReceiver<String>,
    clock: &dyn Clock,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url).await.map_err(|e| match e {
        tungstenite::Error::Http(response) => ClientError::Rejected(response.status().as_u16()),
        e => ClientError::from(e),
    })?;

    tracing::info!("Connected to chat server!");
    println!("{}", MessageFormatter::format_welcome(url, username));
    let prompt = prompt(username);

    let (mut write, mut read) = ws_stream.split();

    if let Some(name) = username {
        write.send(Message::text(create_frame(name)?)).await?;
    }

    loop {
        tokio::select! {
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    print!("{}", MessageFormatter::format_received(text.as_str(), &clock.now()));
                    redisplay_prompt(&prompt);
                }
                Some(Ok(Message::Binary(data))) => {
                    print!("{}", MessageFormatter::format_binary_message(data.len(), &clock.now()));
                    redisplay_prompt(&prompt);
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Server closed the connection");
                    return Err(ClientError::ConnectionLost);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return Err(ClientError::ConnectionLost);
                }
            },
            line = input.recv() => match line {
                Some(line) => {
                    if let Err(e) = write.send(Message::text(chat_frame(&line)?)).await {
                        tracing::warn!("Failed to send message: {}", e);
                        return Err(ClientError::ConnectionLost);
                    }
                    print!("{}", MessageFormatter::format_sent_confirmation(&clock.now()));
                    redisplay_prompt(&prompt);
                }
                None => {
                    // Input closed by the user
                    write.send(Message::Close(None)).await.ok();
                    return Ok(());
                }
            },
        }
    }
}
