//! # Auth Screens
//!
//! The login / registration / password-recovery form as a sum type.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Auth Screen Transitions                             │
//! │                                                                         │
//! │                 create_account                                          │
//! │   ┌───────────┐ ─────────────► ┌─────────────┐                         │
//! │   │ LoggingIn │                │ Registering │                         │
//! │   │ (initial) │ ◄───────────── └─────────────┘                         │
//! │   └───────────┘  registered / cancel_to_login                          │
//! │     │      ▲                                                            │
//! │     │      │ cancel_to_login                                            │
//! │     │ forgot_password                                                   │
//! │     ▼      │                                                            │
//! │   ┌────────────────┐  code_sent   ┌───────────────┐  code_sent (resend) │
//! │   │ ForgotPassword │ ───────────► │ VerifyingCode │ ◄──────┐            │
//! │   └────────────────┘ ◄─────────── └───────────────┘ ───────┘            │
//! │            ▲        cancel_to_forgot     │                              │
//! │            │                             │ code_verified                │
//! │            │                             ▼                              │
//! │   LoggingIn ◄──── password_reset ── ResettingPassword                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each variant carries only the fields its screen shows, so a stale code on
//! the login screen or a password on the verify screen cannot exist. The
//! email travels with every transition so a resend never asks for it again.
//!
//! This module decides *where* the form goes. Sending requests, the busy
//! flag and the status line live in `grocery-client`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;
use ts_rs::TS;

use crate::error::{AuthError, AuthResult};

// =============================================================================
// Screen Kind
// =============================================================================

/// Field-less discriminant of [`AuthScreen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum ScreenKind {
    LoggingIn,
    Registering,
    ForgotPassword,
    VerifyingCode,
    ResettingPassword,
}

impl ScreenKind {
    /// Heading shown above the form.
    pub fn title(&self) -> &'static str {
        match self {
            ScreenKind::LoggingIn => "Login",
            ScreenKind::Registering => "Sign Up",
            ScreenKind::ForgotPassword => "Forgot Password",
            ScreenKind::VerifyingCode => "Verify OTP",
            ScreenKind::ResettingPassword => "Reset Password",
        }
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenKind::LoggingIn => write!(f, "login"),
            ScreenKind::Registering => write!(f, "register"),
            ScreenKind::ForgotPassword => write!(f, "forgot password"),
            ScreenKind::VerifyingCode => write!(f, "verify code"),
            ScreenKind::ResettingPassword => write!(f, "reset password"),
        }
    }
}

// =============================================================================
// Actions and Requests
// =============================================================================

/// Everything a shopper can do on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    SubmitLogin,
    SubmitRegister,
    ForgotPassword,
    CreateAccount,
    RequestCode,
    VerifyCode,
    ResetPassword,
}

impl fmt::Display for AuthAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AuthAction::SubmitLogin => "submit login",
            AuthAction::SubmitRegister => "submit registration",
            AuthAction::ForgotPassword => "open forgot password",
            AuthAction::CreateAccount => "open sign up",
            AuthAction::RequestCode => "request a code",
            AuthAction::VerifyCode => "verify a code",
            AuthAction::ResetPassword => "reset the password",
        };
        f.write_str(text)
    }
}

/// The network-backed steps, with the texts the form shows for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthRequest {
    Login,
    Register,
    SendCode,
    VerifyCode,
    ResetPassword,
}

impl AuthRequest {
    /// Status line after the step succeeds.
    pub fn success_message(&self) -> &'static str {
        match self {
            AuthRequest::Login => "Logged in successfully.",
            AuthRequest::Register => "Account created. You can login now.",
            AuthRequest::SendCode => "OTP sent to your email. Please check inbox.",
            AuthRequest::VerifyCode => "OTP verified. You can now set a new password.",
            AuthRequest::ResetPassword => "Password updated. Please login with new password.",
        }
    }

    /// Status line when the server says no without saying why.
    pub fn rejected_fallback(&self) -> &'static str {
        match self {
            AuthRequest::Login => "Invalid email or password",
            AuthRequest::Register => "Failed to create account",
            AuthRequest::SendCode => "Failed to send OTP",
            AuthRequest::VerifyCode => "Invalid or expired OTP",
            AuthRequest::ResetPassword => "Failed to update password",
        }
    }

    /// Status line when no usable response arrived.
    pub fn network_error(&self) -> &'static str {
        match self {
            AuthRequest::Login => "Network error while logging in",
            AuthRequest::Register => "Network error while creating account",
            AuthRequest::SendCode => "Network error while sending OTP",
            AuthRequest::VerifyCode => "Network error while verifying OTP",
            AuthRequest::ResetPassword => "Network error while updating password",
        }
    }

    /// Button label while the request is outstanding.
    pub fn busy_label(&self) -> &'static str {
        match self {
            AuthRequest::Login => "Logging in...",
            AuthRequest::Register => "Creating account...",
            AuthRequest::SendCode => "Sending...",
            AuthRequest::VerifyCode => "Verifying...",
            AuthRequest::ResetPassword => "Updating...",
        }
    }

    /// The form action this request belongs to.
    pub fn action(&self) -> AuthAction {
        match self {
            AuthRequest::Login => AuthAction::SubmitLogin,
            AuthRequest::Register => AuthAction::SubmitRegister,
            AuthRequest::SendCode => AuthAction::RequestCode,
            AuthRequest::VerifyCode => AuthAction::VerifyCode,
            AuthRequest::ResetPassword => AuthAction::ResetPassword,
        }
    }
}

impl fmt::Display for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AuthRequest::Login => "login",
            AuthRequest::Register => "register",
            AuthRequest::SendCode => "send-code",
            AuthRequest::VerifyCode => "verify-code",
            AuthRequest::ResetPassword => "reset-password",
        };
        f.write_str(text)
    }
}

// =============================================================================
// Auth Screen
// =============================================================================

/// The active screen and the inputs it holds.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthScreen {
    LoggingIn {
        email: String,
        password: String,
    },
    Registering {
        name: String,
        email: String,
        password: String,
    },
    ForgotPassword {
        email: String,
    },
    VerifyingCode {
        email: String,
        code: String,
    },
    ResettingPassword {
        email: String,
        new_password: String,
    },
}

impl Default for AuthScreen {
    fn default() -> Self {
        AuthScreen::LoggingIn {
            email: String::new(),
            password: String::new(),
        }
    }
}

/// Secrets are never printed.
impl fmt::Debug for AuthScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(match self.kind() {
            ScreenKind::LoggingIn => "LoggingIn",
            ScreenKind::Registering => "Registering",
            ScreenKind::ForgotPassword => "ForgotPassword",
            ScreenKind::VerifyingCode => "VerifyingCode",
            ScreenKind::ResettingPassword => "ResettingPassword",
        });
        if let AuthScreen::Registering { name, .. } = self {
            out.field("name", name);
        }
        out.field("email", &self.email());
        out.finish_non_exhaustive()
    }
}

impl AuthScreen {
    /// The initial screen: an empty login form.
    pub fn new() -> Self {
        AuthScreen::default()
    }

    /// Discriminant of the active screen.
    pub fn kind(&self) -> ScreenKind {
        match self {
            AuthScreen::LoggingIn { .. } => ScreenKind::LoggingIn,
            AuthScreen::Registering { .. } => ScreenKind::Registering,
            AuthScreen::ForgotPassword { .. } => ScreenKind::ForgotPassword,
            AuthScreen::VerifyingCode { .. } => ScreenKind::VerifyingCode,
            AuthScreen::ResettingPassword { .. } => ScreenKind::ResettingPassword,
        }
    }

    /// The email typed so far; every screen has one.
    pub fn email(&self) -> &str {
        match self {
            AuthScreen::LoggingIn { email, .. }
            | AuthScreen::Registering { email, .. }
            | AuthScreen::ForgotPassword { email }
            | AuthScreen::VerifyingCode { email, .. }
            | AuthScreen::ResettingPassword { email, .. } => email,
        }
    }

    fn email_mut(&mut self) -> &mut String {
        match self {
            AuthScreen::LoggingIn { email, .. }
            | AuthScreen::Registering { email, .. }
            | AuthScreen::ForgotPassword { email }
            | AuthScreen::VerifyingCode { email, .. }
            | AuthScreen::ResettingPassword { email, .. } => email,
        }
    }

    /// Whether `action` is offered on the current screen.
    pub fn offers(&self, action: AuthAction) -> bool {
        use ScreenKind::*;
        match action {
            AuthAction::SubmitLogin => self.kind() == LoggingIn,
            AuthAction::SubmitRegister => self.kind() == Registering,
            AuthAction::ForgotPassword => matches!(self.kind(), LoggingIn | Registering),
            AuthAction::CreateAccount => self.kind() == LoggingIn,
            AuthAction::RequestCode => matches!(self.kind(), ForgotPassword | VerifyingCode),
            AuthAction::VerifyCode => self.kind() == VerifyingCode,
            AuthAction::ResetPassword => self.kind() == ResettingPassword,
        }
    }

    /// Fails with `InvalidTransition` unless `action` is offered here.
    pub fn ensure_offers(&self, action: AuthAction) -> AuthResult<()> {
        if self.offers(action) {
            Ok(())
        } else {
            Err(AuthError::InvalidTransition {
                screen: self.kind(),
                action,
            })
        }
    }

    // =========================================================================
    // Field Input
    // =========================================================================

    /// Replaces the email on whichever screen is active.
    pub fn set_email(&mut self, value: &str) {
        *self.email_mut() = value.to_string();
    }

    /// Sets the password on the login or sign-up screen.
    ///
    /// Returns false (and changes nothing) on other screens.
    pub fn set_password(&mut self, value: &str) -> bool {
        match self {
            AuthScreen::LoggingIn { password, .. } | AuthScreen::Registering { password, .. } => {
                *password = value.to_string();
                true
            }
            _ => false,
        }
    }

    /// Sets the display name on the sign-up screen.
    pub fn set_name(&mut self, value: &str) -> bool {
        match self {
            AuthScreen::Registering { name, .. } => {
                *name = value.to_string();
                true
            }
            _ => false,
        }
    }

    /// Sets the code on the verify screen.
    pub fn set_code(&mut self, value: &str) -> bool {
        match self {
            AuthScreen::VerifyingCode { code, .. } => {
                *code = value.to_string();
                true
            }
            _ => false,
        }
    }

    /// Sets the new password on the reset screen.
    pub fn set_new_password(&mut self, value: &str) -> bool {
        match self {
            AuthScreen::ResettingPassword { new_password, .. } => {
                *new_password = value.to_string();
                true
            }
            _ => false,
        }
    }

    // =========================================================================
    // Navigation (shopper clicks)
    // =========================================================================

    /// "Forget password" link: login or sign-up → forgot password.
    pub fn forgot_password(&mut self) -> AuthResult<()> {
        self.ensure_offers(AuthAction::ForgotPassword)?;
        let email = mem::take(self.email_mut());
        *self = AuthScreen::ForgotPassword { email };
        Ok(())
    }

    /// "Create an account" link: login → sign-up, keeping email and password.
    pub fn create_account(&mut self) -> AuthResult<()> {
        self.ensure_offers(AuthAction::CreateAccount)?;
        if let AuthScreen::LoggingIn { email, password } = self {
            let next = AuthScreen::Registering {
                name: String::new(),
                email: mem::take(email),
                password: mem::take(password),
            };
            *self = next;
        }
        Ok(())
    }

    /// Back to the login form from anywhere.
    ///
    /// Codes and new passwords of the abandoned step are dropped. Coming from
    /// sign-up ("already have an account") the password is kept, since both
    /// forms share it.
    pub fn cancel_to_login(&mut self) {
        let password = match self {
            AuthScreen::Registering { password, .. } => mem::take(password),
            _ => String::new(),
        };
        let email = mem::take(self.email_mut());
        *self = AuthScreen::LoggingIn { email, password };
    }

    /// Back to the forgot-password form ("change email") from anywhere.
    pub fn cancel_to_forgot(&mut self) {
        let email = mem::take(self.email_mut());
        *self = AuthScreen::ForgotPassword { email };
    }

    // =========================================================================
    // Request Outcomes
    // =========================================================================

    /// The send-code request succeeded.
    ///
    /// From forgot-password this opens the verify screen; on the verify
    /// screen (resend) the screen and the typed code stay as they are.
    pub fn code_sent(&mut self) -> AuthResult<()> {
        self.ensure_offers(AuthAction::RequestCode)?;
        if let AuthScreen::ForgotPassword { email } = self {
            let email = mem::take(email);
            *self = AuthScreen::VerifyingCode {
                email,
                code: String::new(),
            };
        }
        Ok(())
    }

    /// The verify-code request succeeded.
    pub fn code_verified(&mut self) -> AuthResult<()> {
        self.ensure_offers(AuthAction::VerifyCode)?;
        let email = mem::take(self.email_mut());
        *self = AuthScreen::ResettingPassword {
            email,
            new_password: String::new(),
        };
        Ok(())
    }

    /// The reset-password request succeeded; the shopper logs in next.
    pub fn password_reset(&mut self) -> AuthResult<()> {
        self.ensure_offers(AuthAction::ResetPassword)?;
        let email = mem::take(self.email_mut());
        *self = AuthScreen::LoggingIn {
            email,
            password: String::new(),
        };
        Ok(())
    }

    /// The registration request succeeded; the shopper logs in next.
    pub fn registered(&mut self) -> AuthResult<()> {
        self.ensure_offers(AuthAction::SubmitRegister)?;
        let email = mem::take(self.email_mut());
        *self = AuthScreen::LoggingIn {
            email,
            password: String::new(),
        };
        Ok(())
    }

    /// The login succeeded; the form starts over empty.
    pub fn logged_in(&mut self) -> AuthResult<()> {
        self.ensure_offers(AuthAction::SubmitLogin)?;
        *self = AuthScreen::default();
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn verifying(email: &str, code: &str) -> AuthScreen {
        AuthScreen::VerifyingCode {
            email: email.to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn test_initial_screen_is_empty_login() {
        let screen = AuthScreen::new();
        assert_eq!(screen.kind(), ScreenKind::LoggingIn);
        assert_eq!(screen.email(), "");
        assert_eq!(screen.kind().title(), "Login");
    }

    #[test]
    fn test_forgot_then_code_sent_keeps_email() {
        let mut screen = AuthScreen::new();
        screen.forgot_password().unwrap();
        screen.set_email("a@b.com");
        screen.code_sent().unwrap();

        assert_eq!(screen, verifying("a@b.com", ""));
    }

    #[test]
    fn test_resend_is_a_self_loop() {
        let mut screen = verifying("a@b.com", "12");
        screen.code_sent().unwrap();
        assert_eq!(screen, verifying("a@b.com", "12"));
    }

    #[test]
    fn test_full_recovery_path() {
        let mut screen = AuthScreen::new();
        screen.set_email("a@b.com");
        screen.forgot_password().unwrap();
        screen.code_sent().unwrap();
        assert!(screen.set_code("123456"));
        screen.code_verified().unwrap();

        assert_eq!(screen.kind(), ScreenKind::ResettingPassword);
        assert!(screen.set_new_password("hunter2"));
        screen.password_reset().unwrap();

        assert_eq!(
            screen,
            AuthScreen::LoggingIn {
                email: "a@b.com".to_string(),
                password: String::new()
            }
        );
    }

    #[test]
    fn test_register_round_trip() {
        let mut screen = AuthScreen::new();
        screen.set_email("new@shop.dev");
        screen.set_password("pw");
        screen.create_account().unwrap();
        assert!(screen.set_name("Ana"));
        assert_eq!(screen.kind().title(), "Sign Up");

        screen.registered().unwrap();
        assert_eq!(screen.kind(), ScreenKind::LoggingIn);
        assert_eq!(screen.email(), "new@shop.dev");
    }

    #[test]
    fn test_already_have_account_keeps_password() {
        let mut screen = AuthScreen::new();
        screen.set_password("pw");
        screen.create_account().unwrap();
        screen.cancel_to_login();

        assert_eq!(
            screen,
            AuthScreen::LoggingIn {
                email: String::new(),
                password: "pw".to_string()
            }
        );
    }

    #[test]
    fn test_cancel_discards_step_fields_but_not_email() {
        let mut screen = verifying("a@b.com", "999");
        screen.cancel_to_forgot();
        assert_eq!(
            screen,
            AuthScreen::ForgotPassword {
                email: "a@b.com".to_string()
            }
        );

        let mut screen = AuthScreen::ResettingPassword {
            email: "a@b.com".to_string(),
            new_password: "half-typed".to_string(),
        };
        screen.cancel_to_login();
        assert_eq!(
            screen,
            AuthScreen::LoggingIn {
                email: "a@b.com".to_string(),
                password: String::new()
            }
        );
    }

    #[test]
    fn test_outcomes_rejected_on_wrong_screen() {
        let mut screen = AuthScreen::new();
        let err = screen.code_verified().unwrap_err();
        assert_eq!(
            err,
            AuthError::InvalidTransition {
                screen: ScreenKind::LoggingIn,
                action: AuthAction::VerifyCode
            }
        );
        assert_eq!(screen, AuthScreen::new());

        let mut forgot = AuthScreen::ForgotPassword {
            email: "a@b.com".to_string(),
        };
        assert!(forgot.create_account().is_err());
        assert!(forgot.password_reset().is_err());
        assert!(forgot.logged_in().is_err());
        assert_eq!(forgot.kind(), ScreenKind::ForgotPassword);
    }

    #[test]
    fn test_setters_only_touch_fields_of_the_screen() {
        let mut screen = AuthScreen::ForgotPassword {
            email: String::new(),
        };
        assert!(!screen.set_password("pw"));
        assert!(!screen.set_code("1"));
        assert!(!screen.set_new_password("x"));
        assert!(!screen.set_name("n"));
        screen.set_email("x@y.z");
        assert_eq!(screen.email(), "x@y.z");
    }

    #[test]
    fn test_debug_hides_secrets() {
        let screen = AuthScreen::LoggingIn {
            email: "a@b.com".to_string(),
            password: "topsecret".to_string(),
        };
        let printed = format!("{:?}", screen);
        assert!(printed.contains("a@b.com"));
        assert!(!printed.contains("topsecret"));
    }

    #[test]
    fn test_request_texts() {
        assert_eq!(AuthRequest::SendCode.busy_label(), "Sending...");
        assert_eq!(AuthRequest::VerifyCode.busy_label(), "Verifying...");
        assert_eq!(AuthRequest::ResetPassword.busy_label(), "Updating...");
        assert_eq!(
            AuthRequest::ResetPassword.success_message(),
            "Password updated. Please login with new password."
        );
        assert_eq!(AuthRequest::SendCode.action(), AuthAction::RequestCode);
    }
}
