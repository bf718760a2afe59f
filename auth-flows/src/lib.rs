//! Authentication and identity lifecycle workflows for Authline Engine
//!
//! This crate provides the core authentication machinery:
//! - User registration with email verification codes
//! - Credential-based login with account status gating
//! - One-time-code password reset and authenticated password change
//! - Access/refresh token issuance and renewal (HS256, distinct secrets)
//!
//! Persistence is reached through the [`repository::IdentityStore`] trait;
//! outbound mail goes through the [`mailer::Mailer`] port and is dispatched
//! best-effort outside the transaction boundary. The HTTP layer is out of
//! scope: every workflow operation returns either a payload or an
//! [`error::AuthError`] kind for the boundary to translate.

pub mod config;
pub mod emails;
pub mod error;
pub mod mailer;
pub mod models;
pub mod otp;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::{AuthError, Result};
pub use models::*;
pub use service::AuthService;
