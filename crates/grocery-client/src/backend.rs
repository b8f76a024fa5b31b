//! # Auth Backend
//!
//! The seam between the auth flow and whatever answers its requests.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Auth Backend                                   │
//! │                                                                         │
//! │   AuthFlow ──► dyn AuthBackend                                          │
//! │                    │                                                    │
//! │                    ├── HttpAuthBackend (reqwest, JSON POST)             │
//! │                    │     send_code / verify_code / reset_password       │
//! │                    │     login / register   (accounts = "remote")       │
//! │                    │                                                    │
//! │                    └── demo accounts      (accounts = "demo")           │
//! │                          login → demo user, register → ok              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Outcome Mapping
//! | Response | Result |
//! |---|---|
//! | 2xx, `success: true` | `Ok` |
//! | 2xx or non-2xx, `success: false` | `ServerRejected { message }` |
//! | non-2xx, unreadable body | `ServerRejected { message: None }` |
//! | 2xx, unreadable body | `TransportFailure` |
//! | connect / DNS / I/O error | `TransportFailure` |
//! | client deadline exceeded | `Timeout` |

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use grocery_core::{AuthError, AuthResult, User};

use crate::config::{AccountsMode, ApiSettings};
use crate::error::ClientResult;
use crate::protocol::{
    ApiResponse, LoginRequest, RegisterRequest, ResetPasswordRequest, SendCodeRequest,
    VerifyCodeRequest,
};

// =============================================================================
// Backend Trait
// =============================================================================

/// Answers the five auth requests.
///
/// Implementations must not retry on their own; the flow leaves retrying to
/// the shopper.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn send_code(&self, email: &str) -> AuthResult<()>;

    async fn verify_code(&self, email: &str, code: &str) -> AuthResult<()>;

    async fn reset_password(&self, email: &str, new_password: &str) -> AuthResult<()>;

    /// Checks credentials and returns the signed-in user.
    async fn login(&self, email: &str, password: &str) -> AuthResult<User>;

    async fn register(&self, name: &str, email: &str, password: &str) -> AuthResult<()>;
}

// =============================================================================
// HTTP Backend
// =============================================================================

#[derive(Debug, Clone)]
struct Endpoints {
    send_code: Url,
    verify_code: Url,
    reset_password: Url,
    login: Url,
    register: Url,
}

/// [`AuthBackend`] over JSON POSTs.
#[derive(Debug, Clone)]
pub struct HttpAuthBackend {
    client: reqwest::Client,
    endpoints: Endpoints,
    accounts: AccountsMode,
    timeout: Duration,
}

impl HttpAuthBackend {
    /// Builds the client and resolves every endpoint URL up front.
    pub fn new(api: &ApiSettings) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(api.request_timeout())
            .build()?;

        let endpoints = Endpoints {
            send_code: api.endpoint(&api.send_code_path)?,
            verify_code: api.endpoint(&api.verify_code_path)?,
            reset_password: api.endpoint(&api.reset_password_path)?,
            login: api.endpoint(&api.login_path)?,
            register: api.endpoint(&api.register_path)?,
        };

        info!(
            base_url = %api.base_url,
            accounts = %api.accounts,
            timeout_secs = api.request_timeout_secs,
            "Auth backend ready"
        );

        Ok(Self {
            client,
            endpoints,
            accounts: api.accounts,
            timeout: api.request_timeout(),
        })
    }

    pub fn accounts(&self) -> AccountsMode {
        self.accounts
    }

    async fn post<T: Serialize + ?Sized>(&self, url: &Url, body: &T) -> AuthResult<ApiResponse> {
        debug!(endpoint = %url.path(), "Dispatching auth request");

        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let parsed = response.json::<ApiResponse>().await;

        match parsed {
            Ok(reply) if status.is_success() && reply.success => Ok(reply),
            Ok(reply) => {
                debug!(endpoint = %url.path(), status = status.as_u16(), "Auth request rejected");
                Err(AuthError::ServerRejected {
                    message: reply.message,
                })
            }
            Err(e) if status.is_success() => {
                warn!(endpoint = %url.path(), error = %e, "Unreadable auth response");
                Err(AuthError::TransportFailure(format!("unreadable response: {}", e)))
            }
            Err(_) => {
                debug!(endpoint = %url.path(), status = status.as_u16(), "Auth request failed without a body");
                Err(AuthError::ServerRejected { message: None })
            }
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> AuthError {
        if err.is_timeout() {
            warn!(timeout_secs = self.timeout.as_secs(), "Auth request timed out");
            AuthError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            warn!(error = %err, "Auth request transport failure");
            AuthError::TransportFailure(err.to_string())
        }
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn send_code(&self, email: &str) -> AuthResult<()> {
        self.post(&self.endpoints.send_code, &SendCodeRequest { email })
            .await
            .map(|_| ())
    }

    async fn verify_code(&self, email: &str, code: &str) -> AuthResult<()> {
        self.post(&self.endpoints.verify_code, &VerifyCodeRequest { email, code })
            .await
            .map(|_| ())
    }

    async fn reset_password(&self, email: &str, new_password: &str) -> AuthResult<()> {
        self.post(
            &self.endpoints.reset_password,
            &ResetPasswordRequest {
                email,
                new_password,
            },
        )
        .await
        .map(|_| ())
    }

    async fn login(&self, email: &str, password: &str) -> AuthResult<User> {
        if self.accounts == AccountsMode::Demo {
            debug!(email = %email, "Demo login");
            return Ok(User::demo());
        }

        let reply = self
            .post(&self.endpoints.login, &LoginRequest { email, password })
            .await?;

        Ok(reply.user.unwrap_or_else(|| User {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
        }))
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> AuthResult<()> {
        if self.accounts == AccountsMode::Demo {
            debug!(email = %email, "Demo registration");
            return Ok(());
        }

        self.post(
            &self.endpoints.register,
            &RegisterRequest {
                name,
                email,
                password,
            },
        )
        .await
        .map(|_| ())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> ApiSettings {
        ApiSettings {
            base_url: server.uri(),
            accounts: AccountsMode::Remote,
            ..ApiSettings::default()
        }
    }

    #[tokio::test]
    async fn test_send_code_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send-otp"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "email": "a@b.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpAuthBackend::new(&api_for(&server)).unwrap();
        backend.send_code("a@b.com").await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_body_field_names() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/reset-password"))
            .and(body_json(json!({ "email": "a@b.com", "newPassword": "s3cret" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpAuthBackend::new(&api_for(&server)).unwrap();
        backend.reset_password("a@b.com", "s3cret").await.unwrap();
    }

    #[tokio::test]
    async fn test_success_false_is_rejection_with_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send-otp"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": false, "message": "no such account" })),
            )
            .mount(&server)
            .await;

        let backend = HttpAuthBackend::new(&api_for(&server)).unwrap();
        let err = backend.send_code("x@y.z").await.unwrap_err();
        assert_eq!(
            err,
            AuthError::ServerRejected {
                message: Some("no such account".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_non_2xx_without_body_is_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/verify-otp"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let backend = HttpAuthBackend::new(&api_for(&server)).unwrap();
        let err = backend.verify_code("a@b.com", "123").await.unwrap_err();
        assert_eq!(err, AuthError::ServerRejected { message: None });
    }

    #[tokio::test]
    async fn test_non_2xx_with_message_keeps_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/verify-otp"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "success": false, "message": "expired" })),
            )
            .mount(&server)
            .await;

        let backend = HttpAuthBackend::new(&api_for(&server)).unwrap();
        let err = backend.verify_code("a@b.com", "123").await.unwrap_err();
        assert_eq!(
            err,
            AuthError::ServerRejected {
                message: Some("expired".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_garbage_2xx_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let backend = HttpAuthBackend::new(&api_for(&server)).unwrap();
        let err = backend.send_code("a@b.com").await.unwrap_err();
        assert!(matches!(err, AuthError::TransportFailure(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_failure() {
        let server = MockServer::start().await;
        let api = api_for(&server);
        drop(server);

        let backend = HttpAuthBackend::new(&api).unwrap();
        let err = backend.send_code("a@b.com").await.unwrap_err();
        assert!(matches!(err, AuthError::TransportFailure(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let api = ApiSettings {
            request_timeout_secs: 1,
            ..api_for(&server)
        };
        let backend = HttpAuthBackend::new(&api).unwrap();
        let err = backend.send_code("a@b.com").await.unwrap_err();
        assert_eq!(err, AuthError::Timeout { secs: 1 });
    }

    #[tokio::test]
    async fn test_demo_accounts_skip_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let api = ApiSettings {
            accounts: AccountsMode::Demo,
            ..api_for(&server)
        };
        let backend = HttpAuthBackend::new(&api).unwrap();

        assert_eq!(backend.login("any@x.y", "pw").await.unwrap(), User::demo());
        backend.register("Ana", "any@x.y", "pw").await.unwrap();
    }

    #[tokio::test]
    async fn test_remote_login_returns_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/user/login"))
            .and(body_json(json!({ "email": "ana@shop.dev", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "user": { "name": "Ana", "email": "ana@shop.dev" }
            })))
            .mount(&server)
            .await;

        let backend = HttpAuthBackend::new(&api_for(&server)).unwrap();
        let user = backend.login("ana@shop.dev", "pw").await.unwrap();
        assert_eq!(user.name, "Ana");
    }
}
