use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Member,
}

/// Account status gate checked at login. New accounts start as
/// `Deactivate`; activation happens through an administrative process
/// outside these workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Deactivate,
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Deactivate => "DEACTIVATE",
        };
        f.write_str(name)
    }
}

/// Purpose of a one-time code. Validity always requires the type to
/// match, so codes issued for one flow can never be replayed in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpType {
    VerifyEmail,
    ResetPassword,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub is_verified: bool,
    pub image_url: Option<String>,
    pub push_tokens: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields the store needs to create a user row. Status and verification
/// flag are not caller-controlled: every new user starts deactivated and
/// unverified.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub role: UserRole,
    pub image_url: Option<String>,
    pub push_tokens: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneTimeCode {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub otp_type: OtpType,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOtp {
    pub email: String,
    pub code: String,
    pub otp_type: OtpType,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: UserRole,
    pub image_url: Option<String>,
    pub push_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
    pub push_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodePayload {
    pub email: String,
    pub code: String,
    pub otp_type: OtpType,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordPayload {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordPayload {
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordPayload {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenPayload {
    pub refresh_token: String,
}

/// User projection safe to hand back to callers: no password hash, no
/// device tokens.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub is_verified: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for SanitizedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            role: user.role,
            status: user.status,
            is_verified: user.is_verified,
            image_url: user.image_url,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SanitizedUser,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
}
