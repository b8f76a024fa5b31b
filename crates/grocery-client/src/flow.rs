//! # Auth Flow
//!
//! Drives [`AuthScreen`] against an [`AuthBackend`]: validates input,
//! dispatches the request under a deadline, applies the outcome and posts the
//! status line.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       One Network-Backed Step                           │
//! │                                                                         │
//! │  1. screen offers action?      no ──► InvalidTransition                 │
//! │  2. validate input             bad ─► "Please enter <field>", no I/O   │
//! │                                       screen left as it was            │
//! │  3. copy input into screen                                              │
//! │  4. busy = Some(request)       ◄── BusyGuard                           │
//! │  5. backend call under timeout                                          │
//! │  6. busy = None                ◄── guard dropped on EVERY exit          │
//! │  7. ok  ─► screen transition + success message                          │
//! │     err ─► screen unchanged   + error message (retry possible)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every method takes `&mut self`, so a second step cannot start while one is
//! outstanding. Observers that need the busy state while a step is running
//! use [`AuthFlow::subscribe_busy`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use grocery_core::validation::{
    validate_code, validate_email, validate_name, validate_new_password, validate_password,
};
use grocery_core::{AuthError, AuthRequest, AuthResult, AuthScreen, ScreenKind, User};

use crate::backend::AuthBackend;
use crate::config::StorefrontConfig;
use crate::status::StatusBoard;

type BusySender = Arc<watch::Sender<Option<AuthRequest>>>;

// =============================================================================
// Busy Guard
// =============================================================================

/// Marks a request as outstanding until dropped.
struct BusyGuard {
    busy: BusySender,
}

impl BusyGuard {
    fn engage(busy: &BusySender, request: AuthRequest) -> Self {
        busy.send_replace(Some(request));
        Self {
            busy: Arc::clone(busy),
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.send_replace(None);
    }
}

/// Runs `call` with the busy flag raised and a hard deadline.
async fn guarded<T>(
    busy: &BusySender,
    limit: Duration,
    request: AuthRequest,
    call: impl Future<Output = AuthResult<T>>,
) -> AuthResult<T> {
    let _busy = BusyGuard::engage(busy, request);
    debug!(%request, "Auth request in flight");

    match tokio::time::timeout(limit, call).await {
        Ok(outcome) => outcome,
        Err(_) => Err(AuthError::Timeout {
            secs: limit.as_secs(),
        }),
    }
}

// =============================================================================
// Auth Flow
// =============================================================================

pub struct AuthFlow {
    backend: Arc<dyn AuthBackend>,
    screen: AuthScreen,
    busy: BusySender,
    status: StatusBoard,
    timeout: Duration,
}

impl std::fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow")
            .field("screen", &self.screen)
            .field("busy", &*self.busy.borrow())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AuthFlow {
    /// Starts on an empty login screen.
    pub fn new(backend: Arc<dyn AuthBackend>, timeout: Duration, status_ttl: Duration) -> Self {
        let (busy, _) = watch::channel(None);
        Self {
            backend,
            screen: AuthScreen::new(),
            busy: Arc::new(busy),
            status: StatusBoard::new(status_ttl),
            timeout,
        }
    }

    /// Takes the request deadline and status duration from `config`.
    pub fn from_config(backend: Arc<dyn AuthBackend>, config: &StorefrontConfig) -> Self {
        Self::new(
            backend,
            config.api.request_timeout(),
            config.ui.status_duration(),
        )
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn screen(&self) -> &AuthScreen {
        &self.screen
    }

    /// For typing into the current screen's fields.
    pub fn screen_mut(&mut self) -> &mut AuthScreen {
        &mut self.screen
    }

    pub fn kind(&self) -> ScreenKind {
        self.screen.kind()
    }

    pub fn title(&self) -> &'static str {
        self.screen.kind().title()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.borrow().is_some()
    }

    /// Button label for the outstanding request ("Sending...").
    pub fn busy_label(&self) -> Option<&'static str> {
        (*self.busy.borrow()).map(|r| r.busy_label())
    }

    /// Watches the outstanding request from another task.
    pub fn subscribe_busy(&self) -> watch::Receiver<Option<AuthRequest>> {
        self.busy.subscribe()
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// The visible status text, if any.
    pub fn message(&self) -> Option<String> {
        self.status.text()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn forgot_password(&mut self) -> AuthResult<()> {
        let from = self.kind();
        self.screen.forgot_password()?;
        self.log_transition(from);
        Ok(())
    }

    pub fn create_account(&mut self) -> AuthResult<()> {
        let from = self.kind();
        self.screen.create_account()?;
        self.log_transition(from);
        Ok(())
    }

    /// "Back to login" / "already have an account".
    pub fn cancel_to_login(&mut self) {
        let from = self.kind();
        self.screen.cancel_to_login();
        self.log_transition(from);
    }

    /// "Change email" on the verify screen.
    pub fn cancel_to_forgot(&mut self) {
        let from = self.kind();
        self.screen.cancel_to_forgot();
        self.log_transition(from);
    }

    // =========================================================================
    // Network-Backed Steps
    // =========================================================================

    /// Checks credentials; on success the form resets and the user is returned.
    pub async fn submit_login(&mut self, email: &str, password: &str) -> AuthResult<User> {
        let request = AuthRequest::Login;
        self.offered(request)?;
        let email = self.checked(request, validate_email(email))?;
        self.checked(request, validate_password(password))?;
        self.screen.set_email(&email);
        self.screen.set_password(password);

        let outcome = guarded(
            &self.busy,
            self.timeout,
            request,
            self.backend.login(&email, password),
        )
        .await;

        let user = self.settle(request, outcome)?;
        self.advance(request, AuthScreen::logged_in)?;
        info!(email = %user.email, "User logged in");
        Ok(user)
    }

    /// Creates an account; on success the login screen opens with the email.
    pub async fn submit_register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<()> {
        let request = AuthRequest::Register;
        self.offered(request)?;
        let name = self.checked(request, validate_name(name))?;
        let email = self.checked(request, validate_email(email))?;
        self.checked(request, validate_password(password))?;
        self.screen.set_name(&name);
        self.screen.set_email(&email);
        self.screen.set_password(password);

        let outcome = guarded(
            &self.busy,
            self.timeout,
            request,
            self.backend.register(&name, &email, password),
        )
        .await;

        self.settle(request, outcome)?;
        self.advance(request, AuthScreen::registered)
    }

    /// Sends (or re-sends) a one-time code to `email`.
    ///
    /// Offered on the forgot-password screen and, as a resend, on the verify
    /// screen. An empty email fails locally without a request.
    pub async fn request_code(&mut self, email: &str) -> AuthResult<()> {
        let request = AuthRequest::SendCode;
        self.offered(request)?;
        let email = self.checked(request, validate_email(email))?;
        self.screen.set_email(&email);

        let outcome = guarded(
            &self.busy,
            self.timeout,
            request,
            self.backend.send_code(&email),
        )
        .await;

        self.settle(request, outcome)?;
        self.advance(request, AuthScreen::code_sent)
    }

    /// Checks `code` for `email`; on success the reset screen opens.
    pub async fn verify_code(&mut self, email: &str, code: &str) -> AuthResult<()> {
        let request = AuthRequest::VerifyCode;
        self.offered(request)?;
        let email = self.checked(request, validate_email(email))?;
        let code = self.checked(request, validate_code(code))?;
        self.screen.set_email(&email);
        self.screen.set_code(&code);

        let outcome = guarded(
            &self.busy,
            self.timeout,
            request,
            self.backend.verify_code(&email, &code),
        )
        .await;

        self.settle(request, outcome)?;
        self.advance(request, AuthScreen::code_verified)
    }

    /// Stores `new_password`; on success the login screen opens with the email.
    pub async fn reset_password(&mut self, email: &str, new_password: &str) -> AuthResult<()> {
        let request = AuthRequest::ResetPassword;
        self.offered(request)?;
        let email = self.checked(request, validate_email(email))?;
        self.checked(request, validate_new_password(new_password))?;
        self.screen.set_email(&email);
        self.screen.set_new_password(new_password);

        let outcome = guarded(
            &self.busy,
            self.timeout,
            request,
            self.backend.reset_password(&email, new_password),
        )
        .await;

        self.settle(request, outcome)?;
        self.advance(request, AuthScreen::password_reset)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn offered(&self, request: AuthRequest) -> AuthResult<()> {
        self.screen
            .ensure_offers(request.action())
            .map_err(|e| self.report(request, e))
    }

    fn checked<T>(
        &self,
        request: AuthRequest,
        result: Result<T, grocery_core::ValidationError>,
    ) -> AuthResult<T> {
        result.map_err(|e| self.report(request, e.into()))
    }

    fn settle<T>(&self, request: AuthRequest, outcome: AuthResult<T>) -> AuthResult<T> {
        outcome.map_err(|e| self.report(request, e))
    }

    /// Applies a successful outcome to the screen and posts the success text.
    fn advance(
        &mut self,
        request: AuthRequest,
        transition: fn(&mut AuthScreen) -> AuthResult<()>,
    ) -> AuthResult<()> {
        let from = self.kind();
        transition(&mut self.screen).map_err(|e| self.report(request, e))?;
        self.log_transition(from);
        self.status.success(request.success_message());
        Ok(())
    }

    /// Posts the user-facing text for `err` and hands the error back.
    fn report(&self, request: AuthRequest, err: AuthError) -> AuthError {
        if err.is_local() {
            debug!(%request, screen = %self.kind(), error = %err, "Auth step refused locally");
        } else {
            warn!(%request, screen = %self.kind(), error = %err, "Auth step failed");
        }
        self.status.error(err.user_message(request));
        err
    }

    fn log_transition(&self, from: ScreenKind) {
        let to = self.kind();
        if from != to {
            info!(%from, %to, email = %self.screen.email(), "Auth screen changed");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Answers every request with the same outcome.
    struct Scripted {
        outcome: Mutex<AuthResult<()>>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok() -> Arc<Self> {
            Self::with(Ok(()))
        }

        fn with(outcome: AuthResult<()>) -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(outcome),
                delay: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(Ok(())),
                delay: Some(delay),
                calls: AtomicUsize::new(0),
            })
        }

        fn set(&self, outcome: AuthResult<()>) {
            *self.outcome.lock().unwrap() = outcome;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn answer(&self) -> AuthResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AuthBackend for Scripted {
        async fn send_code(&self, _email: &str) -> AuthResult<()> {
            self.answer().await
        }
        async fn verify_code(&self, _email: &str, _code: &str) -> AuthResult<()> {
            self.answer().await
        }
        async fn reset_password(&self, _email: &str, _new_password: &str) -> AuthResult<()> {
            self.answer().await
        }
        async fn login(&self, _email: &str, _password: &str) -> AuthResult<User> {
            self.answer().await.map(|_| User::demo())
        }
        async fn register(&self, _name: &str, _email: &str, _password: &str) -> AuthResult<()> {
            self.answer().await
        }
    }

    fn flow(backend: Arc<Scripted>) -> AuthFlow {
        AuthFlow::new(backend, Duration::from_secs(15), Duration::from_secs(4))
    }

    #[tokio::test]
    async fn test_request_code_moves_to_verify_and_keeps_email() {
        let backend = Scripted::ok();
        let mut flow = flow(backend.clone());

        flow.forgot_password().unwrap();
        flow.request_code("a@b.com").await.unwrap();

        assert_eq!(flow.kind(), ScreenKind::VerifyingCode);
        assert_eq!(flow.screen().email(), "a@b.com");
        assert_eq!(
            flow.message().as_deref(),
            Some("OTP sent to your email. Please check inbox.")
        );
        assert_eq!(backend.calls(), 1);
        assert!(!flow.is_busy());
    }

    #[tokio::test]
    async fn test_empty_email_fails_without_network() {
        let backend = Scripted::ok();
        let mut flow = flow(backend.clone());
        flow.forgot_password().unwrap();
        flow.screen_mut().set_email("a@b.com");
        let before = flow.screen().clone();

        let err = flow.request_code("").await.unwrap_err();

        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(flow.screen(), &before);
        assert_eq!(flow.screen().email(), "a@b.com");
        assert_eq!(flow.message().as_deref(), Some("Please enter email"));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejection_shows_server_message_and_stays() {
        let backend = Scripted::with(Err(AuthError::ServerRejected {
            message: Some("no such account".to_string()),
        }));
        let mut flow = flow(backend);
        flow.forgot_password().unwrap();

        assert!(flow.request_code("a@b.com").await.is_err());
        assert_eq!(flow.kind(), ScreenKind::ForgotPassword);
        assert_eq!(flow.message().as_deref(), Some("no such account"));
        assert!(!flow.is_busy());
    }

    #[tokio::test]
    async fn test_verify_success_moves_once() {
        let backend = Scripted::ok();
        let mut flow = flow(backend.clone());
        flow.forgot_password().unwrap();
        flow.request_code("a@b.com").await.unwrap();

        flow.verify_code("a@b.com", "123456").await.unwrap();
        assert_eq!(flow.kind(), ScreenKind::ResettingPassword);

        // a second verify is no longer offered
        let err = flow.verify_code("a@b.com", "123456").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidTransition { .. }));
        assert_eq!(flow.kind(), ScreenKind::ResettingPassword);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_verify_failure_uses_fallback_and_keeps_code() {
        let backend = Scripted::ok();
        let mut flow = flow(backend.clone());
        flow.forgot_password().unwrap();
        flow.request_code("a@b.com").await.unwrap();

        backend.set(Err(AuthError::ServerRejected { message: None }));
        assert!(flow.verify_code("a@b.com", "000000").await.is_err());

        assert_eq!(flow.kind(), ScreenKind::VerifyingCode);
        assert_eq!(flow.message().as_deref(), Some("Invalid or expired OTP"));
        assert!(matches!(
            flow.screen(),
            AuthScreen::VerifyingCode { code, .. } if code == "000000"
        ));
    }

    #[tokio::test]
    async fn test_empty_code_and_password_prompts() {
        let backend = Scripted::ok();
        let mut flow = flow(backend.clone());
        flow.forgot_password().unwrap();
        flow.request_code("a@b.com").await.unwrap();
        flow.screen_mut().set_code("12");
        let before = flow.screen().clone();

        assert!(flow.verify_code("a@b.com", "  ").await.is_err());
        assert_eq!(flow.message().as_deref(), Some("Please enter OTP"));
        assert_eq!(flow.screen(), &before);

        flow.verify_code("a@b.com", "1").await.unwrap();
        assert!(flow.reset_password("a@b.com", "").await.is_err());
        assert_eq!(flow.message().as_deref(), Some("Please enter new password"));
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_resend_stays_on_verify() {
        let backend = Scripted::ok();
        let mut flow = flow(backend.clone());
        flow.forgot_password().unwrap();
        flow.request_code("a@b.com").await.unwrap();
        flow.screen_mut().set_code("12");

        flow.request_code("a@b.com").await.unwrap();
        assert_eq!(flow.kind(), ScreenKind::VerifyingCode);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_message() {
        let backend = Scripted::with(Err(AuthError::TransportFailure("refused".into())));
        let mut flow = flow(backend);
        flow.forgot_password().unwrap();

        assert!(flow.request_code("a@b.com").await.is_err());
        assert_eq!(
            flow.message().as_deref(),
            Some("Network error while sending OTP")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_backend_times_out_and_clears_busy() {
        let backend = Scripted::slow(Duration::from_secs(60));
        let mut flow = AuthFlow::new(backend, Duration::from_secs(15), Duration::from_secs(4));
        flow.forgot_password().unwrap();
        let busy = flow.subscribe_busy();

        let err = flow.request_code("a@b.com").await.unwrap_err();

        assert_eq!(err, AuthError::Timeout { secs: 15 });
        assert_eq!(flow.kind(), ScreenKind::ForgotPassword);
        assert!(!flow.is_busy());
        assert!(busy.borrow().is_none());
        assert_eq!(
            flow.message().as_deref(),
            Some("Network error while sending OTP")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_visible_while_in_flight() {
        let backend = Scripted::slow(Duration::from_secs(2));
        let mut flow = flow(backend);
        flow.forgot_password().unwrap();
        let mut busy = flow.subscribe_busy();

        let watcher = tokio::spawn(async move {
            busy.changed().await.unwrap();
            *busy.borrow()
        });

        flow.request_code("a@b.com").await.unwrap();
        assert_eq!(watcher.await.unwrap(), Some(AuthRequest::SendCode));
        assert_eq!(AuthRequest::SendCode.busy_label(), "Sending...");
        assert!(flow.busy_label().is_none());
    }

    #[tokio::test]
    async fn test_full_recovery_path() {
        let backend = Scripted::ok();
        let mut flow = flow(backend);

        flow.forgot_password().unwrap();
        flow.request_code("a@b.com").await.unwrap();
        flow.verify_code("a@b.com", "123456").await.unwrap();
        flow.reset_password("a@b.com", "n3w").await.unwrap();

        assert_eq!(flow.kind(), ScreenKind::LoggingIn);
        assert_eq!(flow.screen().email(), "a@b.com");
        assert_eq!(
            flow.message().as_deref(),
            Some("Password updated. Please login with new password.")
        );
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let backend = Scripted::ok();
        let mut flow = flow(backend);

        flow.create_account().unwrap();
        flow.submit_register("Ana", "ana@shop.dev", "pw").await.unwrap();
        assert_eq!(flow.kind(), ScreenKind::LoggingIn);
        assert_eq!(
            flow.message().as_deref(),
            Some("Account created. You can login now.")
        );

        let user = flow.submit_login("ana@shop.dev", "pw").await.unwrap();
        assert_eq!(user, User::demo());
        assert_eq!(flow.screen(), &AuthScreen::new());
    }

    #[tokio::test]
    async fn test_failed_register_stays() {
        let backend = Scripted::with(Err(AuthError::ServerRejected { message: None }));
        let mut flow = flow(backend);
        flow.create_account().unwrap();

        assert!(flow.submit_register("Ana", "a@b.com", "pw").await.is_err());
        assert_eq!(flow.kind(), ScreenKind::Registering);
        assert_eq!(flow.message().as_deref(), Some("Failed to create account"));
    }

    #[tokio::test]
    async fn test_cancel_paths_keep_email() {
        let mut flow = flow(Scripted::ok());
        flow.forgot_password().unwrap();
        flow.request_code("a@b.com").await.unwrap();

        flow.cancel_to_forgot();
        assert_eq!(flow.kind(), ScreenKind::ForgotPassword);
        assert_eq!(flow.title(), "Forgot Password");

        flow.cancel_to_login();
        assert_eq!(flow.kind(), ScreenKind::LoggingIn);
        assert_eq!(flow.screen().email(), "a@b.com");
    }
}
