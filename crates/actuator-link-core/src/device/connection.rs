//! A single WebSocket session with a device.

use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::config::LinkConfig;
use crate::error::{CoreError, LinkError, ProtocolError};
use crate::protocol::{decode, encode, InboundMessage, OutboundMessage};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of a connection.
pub struct MessageSink {
    url: String,
    sink: SplitSink<WsStream, Message>,
}

impl MessageSink {
    /// Send a message as a JSON text frame. No acknowledgement is awaited.
    pub async fn send(&mut self, message: &OutboundMessage) -> Result<(), CoreError> {
        let text = encode(message)?;
        debug!(url = %self.url, frame = %text, "sending message");

        self.sink
            .send(Message::Text(text))
            .await
            .map_err(|e| LinkError::Send(e.to_string()))?;

        Ok(())
    }

    /// Send a close frame. Errors are logged, the socket is gone either way.
    pub async fn close(mut self) {
        if let Err(e) = self.sink.close().await {
            debug!(url = %self.url, error = %e, "close handshake failed");
        }
    }
}

/// Read half of a connection.
pub struct MessageStream {
    url: String,
    stream: SplitStream<WsStream>,
}

impl MessageStream {
    /// Wait for the next text frame and decode it.
    ///
    /// Returns `None` once the socket is closed. Socket errors end the
    /// session the same way a close frame does. Non-text frames are skipped.
    pub async fn next_message(&mut self) -> Option<Result<InboundMessage, ProtocolError>> {
        while let Some(frame) = self.stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    debug!(url = %self.url, frame = %text, "message received");
                    return Some(decode(&text));
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => {
                    debug!(url = %self.url, error = %e, "socket error");
                    return None;
                }
            }
        }

        None
    }
}

/// Open WebSocket connection to a single device.
pub struct Connection {
    sink: MessageSink,
    stream: MessageStream,
}

impl Connection {
    /// Connect to `url`, giving up after `connect_timeout`.
    pub async fn open(url: &str, connect_timeout: Duration) -> Result<Self, LinkError> {
        let (ws_stream, _) = timeout(connect_timeout, connect_async(url))
            .await
            .map_err(|_| LinkError::ConnectTimeout {
                url: url.to_string(),
            })?
            .map_err(|e| LinkError::Connect {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let (sink, stream) = ws_stream.split();

        Ok(Self {
            sink: MessageSink {
                url: url.to_string(),
                sink,
            },
            stream: MessageStream {
                url: url.to_string(),
                stream,
            },
        })
    }

    pub fn url(&self) -> &str {
        &self.sink.url
    }

    pub async fn send(&mut self, message: &OutboundMessage) -> Result<(), CoreError> {
        self.sink.send(message).await
    }

    pub async fn next_message(&mut self) -> Option<Result<InboundMessage, ProtocolError>> {
        self.stream.next_message().await
    }

    /// Split into independently usable halves.
    pub fn split(self) -> (MessageSink, MessageStream) {
        (self.sink, self.stream)
    }

    pub async fn close(self) {
        self.sink.close().await
    }
}

/// Send one message to a device.
///
/// Opens a fresh connection, sends the message and closes.
pub async fn send_message(config: &LinkConfig, message: &OutboundMessage) -> Result<(), CoreError> {
    let url = config.url()?;
    let mut conn = Connection::open(&url, config.connect_timeout()).await?;
    let result = conn.send(message).await;
    conn.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ButtonAction;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// Accepts one client, forwards every text frame it sends, then replies
    /// with `replies` and closes.
    async fn one_shot_server(replies: Vec<Message>) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            for reply in replies {
                ws.send(reply).await.unwrap();
            }
            while let Some(Ok(frame)) = ws.next().await {
                match frame {
                    Message::Text(text) => {
                        let _ = tx.send(text);
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        });

        (addr.to_string(), rx)
    }

    #[tokio::test]
    async fn test_send_message_writes_one_frame() {
        let (host, mut frames) = one_shot_server(Vec::new()).await;
        let config = LinkConfig::new(host);

        send_message(&config, &OutboundMessage::button(ButtonAction::Home))
            .await
            .unwrap();

        let frame = frames.recv().await.unwrap();
        assert_eq!(frame, r#"{"type":"button","action":"home"}"#);
        assert!(frames.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_next_message_decodes_and_skips_binary() {
        let (host, _frames) = one_shot_server(vec![
            Message::Binary(vec![1, 2, 3]),
            Message::Text(r#"{"type":"serial","text":"hello"}"#.to_string()),
            Message::Text("garbage".to_string()),
            Message::Close(None),
        ])
        .await;

        let url = format!("ws://{}/ws", host);
        let mut conn = Connection::open(&url, Duration::from_secs(2)).await.unwrap();
        assert_eq!(conn.url(), url);

        let first = conn.next_message().await.unwrap().unwrap();
        assert_eq!(
            first,
            InboundMessage::Serial {
                text: "hello".into()
            }
        );

        let second = conn.next_message().await.unwrap();
        assert!(matches!(second, Err(ProtocolError::Malformed(_))));

        assert!(conn.next_message().await.is_none());
    }

    #[tokio::test]
    async fn test_open_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("ws://{}/ws", addr);
        let err = Connection::open(&url, Duration::from_secs(2))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, LinkError::Connect { .. }));
    }
}
