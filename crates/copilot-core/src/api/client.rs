//! API client for the Alfa Copilot backend.
//!
//! Only the login endpoint is wired up. It comes in two shapes (see
//! [`LoginMethod`]): a JSON `POST` and a bodyless `GET`.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use tracing::debug;

use super::ApiError;
use crate::auth::{AuthBackend, Credentials};
use crate::config::{Config, LoginMethod};
use crate::models::UserInfo;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the Alfa Copilot backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_base: String,
    login_method: LoginMethod,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base(),
            login_method: config.login_method,
        })
    }

    pub fn login_url(&self) -> String {
        match self.login_method {
            LoginMethod::Post => format!("{}/login", self.api_base),
            LoginMethod::Get => format!("{}/login/", self.api_base),
        }
    }

    /// Send one login request and parse the user info from the response
    pub async fn login(&self, credentials: &Credentials) -> Result<UserInfo, ApiError> {
        let url = self.login_url();
        debug!(%url, method = %self.login_method, "Sending login request");

        let request = match self.login_method {
            LoginMethod::Post => self
                .client
                .post(&url)
                .header(header::CONTENT_TYPE, "application/json")
                .json(credentials),
            LoginMethod::Get => self.client.get(&url),
        };

        let response = request.header(header::ACCEPT, "application/json").send().await?;
        let response = Self::check_response(response).await?;
        let body = response.text().await?;
        Self::parse_user_info(&body)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    fn parse_user_info(body: &str) -> Result<UserInfo, ApiError> {
        serde_json::from_str(body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse login response: {}", e)))
    }
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<UserInfo, ApiError> {
        ApiClient::login(self, credentials).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::task::JoinHandle;

    use super::*;
    use crate::auth::{
        AuthenticationFailure, MemorySessionStore, SessionContext, SessionEstablisher,
        SignInOutcome,
    };
    use crate::router::Navigator;

    fn client(base: &str, method: LoginMethod) -> ApiClient {
        let config = Config {
            api_base: Some(base.to_string()),
            login_method: method,
            ..Default::default()
        };
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_login_url_per_method() {
        assert_eq!(
            client("https://api.example.com", LoginMethod::Post).login_url(),
            "https://api.example.com/login"
        );
        assert_eq!(
            client("https://api.example.com/", LoginMethod::Get).login_url(),
            "https://api.example.com/login/"
        );
    }

    #[test]
    fn test_parse_user_info_accepts_email_object() {
        let info = ApiClient::parse_user_info(r#"{"email":"a@b.com","token":"t"}"#).unwrap();
        assert_eq!(info.email, "a@b.com");
    }

    #[test]
    fn test_parse_user_info_rejects_non_json() {
        assert!(matches!(
            ApiClient::parse_user_info("<html>Service Unavailable</html>"),
            Err(ApiError::InvalidResponse(_))
        ));
        assert!(matches!(
            ApiClient::parse_user_info(""),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_user_info_rejects_missing_email() {
        assert!(matches!(
            ApiClient::parse_user_info(r#"{"token":"abc","user":{"id":"1"}}"#),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let client = client("http://127.0.0.1:9", LoginMethod::Post);
        let result = client.login(&Credentials::new("a@b.com", "pw")).await;
        assert!(matches!(result, Err(ApiError::NetworkError(_))));
    }

    /// A request as seen by the server: lowercased head and raw body
    struct ReceivedRequest {
        head: String,
        body: String,
    }

    fn header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    /// Serve exactly one HTTP exchange on a local port
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<ReceivedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];

            let (head, body_start, body_len) = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before headers");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = header_end(&buf) {
                    let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                    let len = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .map(|v| v.trim().parse::<usize>().unwrap())
                        .unwrap_or(0);
                    break (head, end + 4, len);
                }
            };
            while buf.len() < body_start + body_len {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before body");
                buf.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            ReceivedRequest {
                head,
                body: String::from_utf8_lossy(&buf[body_start..body_start + body_len]).to_string(),
            }
        });

        (base, handle)
    }

    fn establisher(
        base: &str,
        method: LoginMethod,
    ) -> (
        SessionEstablisher<ApiClient, MemorySessionStore>,
        UnboundedReceiver<String>,
    ) {
        let (navigator, nav_rx) = Navigator::channel();
        let establisher = SessionEstablisher::new(
            Arc::new(client(base, method)),
            SessionContext::new(MemorySessionStore::default()),
            navigator,
        );
        (establisher, nav_rx)
    }

    #[tokio::test]
    async fn test_post_login_sends_json_credentials() {
        let (base, server) = serve_once("200 OK", r#"{"email":"a@b.com","name":"A"}"#).await;
        let (establisher, mut nav_rx) = establisher(&base, LoginMethod::Post);

        let outcome = establisher
            .submit(Credentials::new("a@b.com", "pw"))
            .await
            .unwrap();
        assert!(matches!(outcome, SignInOutcome::Established(ref u) if u.email == "a@b.com"));

        let request = server.await.unwrap();
        assert!(request.head.starts_with("post /login http/1.1"));
        assert!(request.head.contains("content-type: application/json"));
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body, serde_json::json!({"email": "a@b.com", "password": "pw"}));

        assert_eq!(nav_rx.try_recv().unwrap(), "/");
        assert!(nav_rx.try_recv().is_err());
        assert_eq!(
            establisher.session().authorization().await.as_deref(),
            Some("Basic a@b.com:pw")
        );
    }

    #[tokio::test]
    async fn test_non_json_success_body_fails_login() {
        let (base, server) = serve_once("200 OK", "<html>ok</html>").await;
        let (establisher, mut nav_rx) = establisher(&base, LoginMethod::Post);

        let result = establisher.submit(Credentials::new("a@b.com", "pw")).await;
        assert!(matches!(result, Err(AuthenticationFailure)));

        server.await.unwrap();
        assert!(nav_rx.try_recv().is_err());
        assert!(!establisher.session().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_unauthorized_fails_login() {
        let (base, server) = serve_once("401 Unauthorized", r#"{"detail":"bad"}"#).await;
        let (establisher, mut nav_rx) = establisher(&base, LoginMethod::Post);

        let result = establisher.submit(Credentials::new("a@b.com", "wrong")).await;
        assert!(matches!(result, Err(AuthenticationFailure)));

        server.await.unwrap();
        assert!(nav_rx.try_recv().is_err());
        assert!(!establisher.session().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_get_login_sends_no_body() {
        let (base, server) = serve_once("200 OK", r#"{"email":"a@b.com"}"#).await;
        let (establisher, _nav_rx) = establisher(&base, LoginMethod::Get);

        establisher
            .submit(Credentials::new("a@b.com", "pw"))
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.head.starts_with("get /login/ http/1.1"));
        assert!(request.body.is_empty());
    }
}
