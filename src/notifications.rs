//! Live notification channel. Authenticated solely by the `ws_token` cookie
//! scoped to the notifications path; without it there is no live connection.

use futures_util::StreamExt;
use reqwest::Url;
use serde_json::Value as JsonValue;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::{SessionError, SessionResult};
use crate::identity::WS_NOTIFICATIONS_PATH;
use crate::store::CookieJar;

/// Convert `http(s)://host[:port]/...` to `ws(s)://host[:port]/ws/notifications`.
pub fn notifications_url(api_base: &Url) -> SessionResult<Url> {
    let mut ws = api_base.clone();
    let scheme = if ws.scheme() == "https" { "wss" } else { "ws" };
    ws.set_scheme(scheme)
        .map_err(|_| SessionError::Config(format!("cannot derive websocket url from {}", api_base)))?;
    ws.join(WS_NOTIFICATIONS_PATH)
        .map_err(|e| SessionError::Config(e.to_string()))
}

/// Upgrade request carrying the cookies scoped to the notifications path.
pub fn connect_request(api_base: &Url, cookies: &dyn CookieJar) -> SessionResult<Request> {
    let url = notifications_url(api_base)?;
    let cookie_header = cookies
        .header_for(url.path())
        .ok_or_else(|| SessionError::NoLiveConnection("no ws_token cookie".into()))?;
    let mut req = url
        .as_str()
        .into_client_request()
        .map_err(|e| SessionError::NoLiveConnection(e.to_string()))?;
    let value = HeaderValue::from_str(&cookie_header)
        .map_err(|_| SessionError::NoLiveConnection("cookie is not a valid header value".into()))?;
    req.headers_mut().insert("cookie", value);
    Ok(req)
}

pub struct NotificationStream {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl NotificationStream {
    pub async fn connect(api_base: &Url, cookies: &dyn CookieJar) -> SessionResult<Self> {
        let req = connect_request(api_base, cookies)?;
        let (stream, _resp) = tokio_tungstenite::connect_async(req)
            .await
            .map_err(|e| SessionError::NoLiveConnection(e.to_string()))?;
        tracing::info!(target: "ssui::notifications", "connected to notifications channel");
        Ok(Self { stream })
    }

    /// Next JSON notification; `None` once the server closes the channel.
    /// Non-JSON text frames are passed through as JSON strings.
    pub async fn next(&mut self) -> Option<SessionResult<JsonValue>> {
        while let Some(msg) = self.stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    let text = text.to_string();
                    let value = serde_json::from_str(&text).unwrap_or(JsonValue::String(text));
                    return Some(Ok(value));
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => return Some(Err(SessionError::NoLiveConnection(e.to_string()))),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CookieOptions, MemoryCookieJar};

    #[test]
    fn ws_url_from_http_base() {
        let url = notifications_url(&Url::parse("https://portal.example.com/ui/").unwrap()).unwrap();
        assert_eq!(url.as_str(), "wss://portal.example.com/ws/notifications");
        let url = notifications_url(&Url::parse("http://127.0.0.1:3000").unwrap()).unwrap();
        assert_eq!(url.as_str(), "ws://127.0.0.1:3000/ws/notifications");
    }

    #[test]
    fn request_requires_ws_token_cookie() {
        let base = Url::parse("http://127.0.0.1:3000").unwrap();
        let jar = MemoryCookieJar::new();
        let err = connect_request(&base, &jar).expect_err("no cookie");
        assert!(matches!(err, SessionError::NoLiveConnection(_)));

        // A cookie scoped elsewhere does not count.
        jar.put("ws_token", "abc", CookieOptions::with_path("/api"));
        assert!(connect_request(&base, &jar).is_err());

        jar.put("ws_token", "abc", CookieOptions::with_path(WS_NOTIFICATIONS_PATH));
        let req = connect_request(&base, &jar).expect("request");
        assert_eq!(req.headers().get("cookie").unwrap(), "ws_token=abc");
        assert_eq!(req.uri().path(), "/ws/notifications");
    }
}
