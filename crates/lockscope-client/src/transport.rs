//! Transport seam for the state stream.
//!
//! The store only needs "open a connection, then give me text messages until
//! it ends". [`Connector`] captures exactly that, so tests can swap the
//! WebSocket for an in-process channel.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::constants::CONNECT_TIMEOUT;

/// Inbound text messages from one open connection.
///
/// The stream ending (`None`) means the connection closed.
pub type MessageStream = BoxStream<'static, Result<String, TransportError>>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),
    #[error("binary frame is not valid UTF-8")]
    InvalidUtf8,
    #[error("{0}")]
    Other(String),
}

impl From<tungstenite::Error> for TransportError {
    fn from(e: tungstenite::Error) -> Self {
        TransportError::WebSocket(Box::new(e))
    }
}

/// Opens streaming connections to the backend.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self) -> Result<MessageStream, TransportError>;
}

/// WebSocket connector for the backend's `/ws` endpoint.
#[derive(Clone, Debug)]
pub struct WsConnector {
    url: String,
    timeout: Duration,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: CONNECT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> Result<MessageStream, TransportError> {
        let (socket, _response) =
            tokio::time::timeout(self.timeout, tokio_tungstenite::connect_async(self.url.as_str()))
                .await
                .map_err(|_| TransportError::Timeout(self.timeout))??;

        let messages = socket.filter_map(|frame| async move { text_payload(frame) });
        Ok(messages.boxed())
    }
}

/// Map a WebSocket frame to a text payload, skipping control frames.
fn text_payload(
    frame: Result<Message, tungstenite::Error>,
) -> Option<Result<String, TransportError>> {
    match frame {
        Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
        Ok(Message::Binary(bytes)) => {
            Some(String::from_utf8(bytes.to_vec()).map_err(|_| TransportError::InvalidUtf8))
        }
        Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_) | Message::Close(_)) => None,
        Err(e) => Some(Err(e.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_frames_pass_through() {
        let out = text_payload(Ok(Message::text("{\"a\": 1}"))).unwrap().unwrap();
        assert_eq!(out, "{\"a\": 1}");
    }

    #[test]
    fn test_binary_frames_must_be_utf8() {
        let ok = text_payload(Ok(Message::binary(b"{}".to_vec()))).unwrap();
        assert_eq!(ok.unwrap(), "{}");

        let bad = text_payload(Ok(Message::binary(vec![0xff, 0xfe]))).unwrap();
        assert!(matches!(bad, Err(TransportError::InvalidUtf8)));
    }

    #[test]
    fn test_control_frames_skipped() {
        assert!(text_payload(Ok(Message::Ping(Default::default()))).is_none());
        assert!(text_payload(Ok(Message::Close(None))).is_none());
    }

    #[test]
    fn test_socket_errors_surface() {
        let out = text_payload(Err(tungstenite::Error::ConnectionClosed)).unwrap();
        assert!(matches!(out, Err(TransportError::WebSocket(_))));
    }

    #[tokio::test]
    async fn test_connect_refused_is_an_error() {
        // Port 9 (discard) on loopback is almost never listening.
        let connector = WsConnector::new("ws://127.0.0.1:9/ws")
            .with_timeout(Duration::from_secs(2));
        assert!(connector.connect().await.is_err());
    }
}
