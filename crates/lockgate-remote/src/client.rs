//! HTTP implementation of [`AuthService`]

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::error::RemoteError;
use crate::service::AuthService;
use crate::types::{HealthResponse, LoginRequest, LoginResponse, ProfilesResponse, VerifyResponse};
use crate::Result;

const USER_AGENT: &str = concat!("lockgate/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct HttpAuthService {
    client: Client,
    base_url: Url,
    health_timeout: Duration,
    request_timeout: Duration,
}

impl HttpAuthService {
    pub fn new(base_url: Url, health_timeout: Duration, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(request_timeout)
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
            health_timeout,
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, timeout: Duration) -> Result<T> {
        let response = request.timeout(timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn health(&self) -> Result<HealthResponse> {
        let url = self.endpoint("health")?;
        tracing::trace!(url = %url, "Probing auth service");
        self.fetch(self.client.get(url), self.health_timeout).await
    }

    async fn profiles(&self) -> Result<ProfilesResponse> {
        let url = self.endpoint("profiles")?;
        self.fetch(self.client.get(url), self.request_timeout).await
    }

    async fn login(&self, password: &SecretString, profile: &str) -> Result<LoginResponse> {
        let url = self.endpoint("auth/login")?;
        tracing::debug!(url = %url, profile = %profile, "Submitting login");

        let body = LoginRequest {
            password: password.expose_secret(),
            profile,
        };
        self.fetch(self.client.post(url).json(&body), self.request_timeout)
            .await
    }

    async fn verify(&self, token: &str) -> Result<VerifyResponse> {
        let url = self.endpoint("auth/verify")?;
        let request = self.client.get(url).query(&[("token", token)]);
        self.fetch(request, self.request_timeout).await
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(uri: &str) -> HttpAuthService {
        HttpAuthService::new(
            Url::parse(uri).unwrap(),
            Duration::from_millis(200),
            Duration::from_millis(500),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let prefixed = service("http://127.0.0.1:27843/gate");
        assert_eq!(
            prefixed.endpoint("auth/verify").unwrap().as_str(),
            "http://127.0.0.1:27843/gate/auth/verify"
        );

        let bare = service("http://127.0.0.1:27843");
        assert_eq!(
            bare.endpoint("health").unwrap().as_str(),
            "http://127.0.0.1:27843/health"
        );
    }

    #[tokio::test]
    async fn test_health_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
            .mount(&server)
            .await;

        let health = service(&server.uri()).health().await.unwrap();
        assert!(health.is_healthy());
    }

    #[tokio::test]
    async fn test_health_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "healthy"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = service(&server.uri()).health().await.unwrap_err();
        assert!(matches!(err, RemoteError::Timeout), "got {err:?}");
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_login_posts_password_and_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"password": "hunter2", "profile": "Default"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "token": "abc",
                "profile_launched": "Work",
                "different_profile": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let password = SecretString::from("hunter2".to_string());
        let response = service(&server.uri())
            .login(&password, "Default")
            .await
            .unwrap();
        assert_eq!(response.token.as_deref(), Some("abc"));
        assert_eq!(response.profile_launched.as_deref(), Some("Work"));
        assert!(response.different_profile);
    }

    #[tokio::test]
    async fn test_verify_encodes_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/verify"))
            .and(query_param("token", "a b&c"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true})))
            .mount(&server)
            .await;

        let response = service(&server.uri()).verify("a b&c").await.unwrap();
        assert!(response.valid);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profiles"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = service(&server.uri()).profiles().await.unwrap_err();
        assert!(matches!(err, RemoteError::Status(500)));
        assert!(!err.is_network());
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = service(&server.uri()).verify("t").await.unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network() {
        // Grab a free port, then release it so nothing is listening there
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = service(&format!("http://127.0.0.1:{port}"))
            .health()
            .await
            .unwrap_err();
        assert!(err.is_network(), "got {err:?}");
    }
}
