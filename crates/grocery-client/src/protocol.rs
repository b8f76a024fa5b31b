//! # Wire Protocol
//!
//! JSON bodies exchanged with the auth API.
//!
//! ```text
//! POST send-otp        { email }                 → { success, message? }
//! POST verify-otp      { email, code }           → { success, message? }
//! POST reset-password  { email, newPassword }    → { success, message? }
//! POST user/login      { email, password }       → { success, message?, user? }
//! POST user/register   { name, email, password } → { success, message? }
//! ```
//!
//! Request structs borrow their fields; nothing here outlives the call.

use serde::{Deserialize, Serialize};

use grocery_core::User;

#[derive(Debug, Serialize)]
pub struct SendCodeRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest<'a> {
    pub email: &'a str,
    pub new_password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Common response envelope.
///
/// A missing `success` field reads as failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub user: Option<User>,
}
