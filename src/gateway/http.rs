use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Url;

use super::{AuthGateway, Credential};
use crate::config::PortalConfig;
use crate::error::{SessionError, SessionResult};
use crate::identity::{AuthorizationPayload, WsTokenCredential};
use crate::identity::pause;
use crate::identity::ws_token::WsTokenBody;

const AUTH_TOKEN_HEADER: &str = "x-auth-token";
const GROUP_HEADER: &str = "x-miq-group";

/// Portal REST API client.
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    authorization_url: Url,
    config: PortalConfig,
}

impl HttpGateway {
    pub fn new(config: PortalConfig) -> SessionResult<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SessionError::Config(format!("http client: {}", e)))?;
        let authorization_url = config.endpoint(&config.authorization_path)?;
        Ok(Self { client, authorization_url, config })
    }

    pub fn base(&self) -> &Url { &self.config.api_base }

    fn headers(credential: &Credential) -> Result<HeaderMap, String> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &credential.token {
            let v = HeaderValue::from_str(token).map_err(|_| "auth token is not a valid header value".to_string())?;
            headers.insert(AUTH_TOKEN_HEADER, v);
        }
        if let Some(group) = &credential.group {
            let v = HeaderValue::from_str(group).map_err(|_| format!("group '{}' is not a valid header value", group))?;
            headers.insert(GROUP_HEADER, v);
        }
        Ok(headers)
    }

    fn ws_token_url(&self, path: &str) -> SessionResult<Url> {
        let path = if path.is_empty() { self.config.ws_token_path.as_str() } else { path };
        self.config.endpoint(path).map_err(|e| SessionError::TokenIssuance(e.to_string()))
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn fetch_authorization(&self, credential: &Credential) -> SessionResult<AuthorizationPayload> {
        let headers = Self::headers(credential).map_err(SessionError::AuthFetch)?;
        tracing::debug!(target: "ssui::gateway", "GET {} group={:?}", self.authorization_url, credential.group);
        pause::throttle().await;
        let resp = self
            .client
            .get(self.authorization_url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(|e| SessionError::AuthFetch(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SessionError::AuthFetch(format!("HTTP {}", status)));
        }
        resp.json::<AuthorizationPayload>()
            .await
            .map_err(|e| SessionError::AuthFetch(format!("invalid authorization body: {}", e)))
    }

    async fn issue_ws_token(&self, credential: &Credential, path: &str) -> SessionResult<WsTokenCredential> {
        let url = self.ws_token_url(path)?;
        let headers = Self::headers(credential).map_err(SessionError::TokenIssuance)?;
        tracing::debug!(target: "ssui::gateway", "GET {} (ws token)", url);
        pause::throttle().await;
        let resp = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| SessionError::TokenIssuance(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SessionError::TokenIssuance(format!("HTTP {}", status)));
        }
        let body: WsTokenBody = resp
            .json()
            .await
            .map_err(|e| SessionError::TokenIssuance(format!("invalid token body: {}", e)))?;
        Ok(body.into_credential())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_follow_credential() {
        let h = HttpGateway::headers(&Credential::default()).unwrap();
        assert!(h.is_empty());
        let h = HttpGateway::headers(&Credential { token: Some("abc".into()), group: Some("EvmGroup-user".into()) }).unwrap();
        assert_eq!(h.get(AUTH_TOKEN_HEADER).unwrap(), "abc");
        assert_eq!(h.get(GROUP_HEADER).unwrap(), "EvmGroup-user");
        assert!(HttpGateway::headers(&Credential { token: Some("bad\nvalue".into()), group: None }).is_err());
    }

    #[test]
    fn ws_token_url_defaults_when_path_empty() {
        let gw = HttpGateway::new(PortalConfig::default()).unwrap();
        let url = gw.ws_token_url("").unwrap();
        assert_eq!(url.path(), "/api/auth");
        assert_eq!(url.query(), Some("requester_type=ws"));
        let custom = gw.ws_token_url("/custom/token").unwrap();
        assert_eq!(custom.path(), "/custom/token");
    }
}
