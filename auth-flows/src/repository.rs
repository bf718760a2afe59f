use crate::error::{AuthError, Result};
use crate::models::{NewOtp, NewUser, OneTimeCode, OtpType, User, UserStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Persistence contract the workflow engine depends on. Every method is
/// one atomic unit against the backing store: implementations over a SQL
/// store map each compound method to a single transaction, and a racing
/// duplicate insert must surface as `Conflict` (the engine pre-checks,
/// the store is the final arbiter of email uniqueness).
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Creates the user row and its verification code together: both
    /// commit or neither does.
    async fn create_user_with_otp(&self, user: NewUser, otp: NewOtp) -> Result<User>;

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<()>;

    /// Status transitions happen through administrative processes, not
    /// through the auth workflows themselves.
    async fn update_status(&self, user_id: Uuid, status: UserStatus) -> Result<()>;

    /// Upserts a device token into the user's set.
    async fn add_push_token(&self, user_id: Uuid, token: &str) -> Result<()>;

    /// Prunes delivery-rejected device tokens from the user's set.
    async fn remove_push_tokens(&self, user_id: Uuid, tokens: &[String]) -> Result<()>;

    async fn create_otp(&self, otp: NewOtp) -> Result<OneTimeCode>;

    /// Newest non-expired code matching email, code, and type.
    async fn find_valid_otp(
        &self,
        email: &str,
        code: &str,
        otp_type: OtpType,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>>;

    /// Newest non-expired code matching code and type alone; the reset
    /// flow has only the code as a handle.
    async fn find_valid_otp_by_code(
        &self,
        code: &str,
        otp_type: OtpType,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>>;

    /// Marks the user verified and deletes every code for that email
    /// matching the type or already expired, atomically.
    async fn mark_verified_and_purge_otps(
        &self,
        email: &str,
        otp_type: OtpType,
        now: DateTime<Utc>,
    ) -> Result<User>;

    /// Replaces the user's password hash and deletes every code for that
    /// email matching the type or already expired, atomically.
    async fn reset_password_and_purge_otps(
        &self,
        email: &str,
        password_hash: &str,
        otp_type: OtpType,
        now: DateTime<Utc>,
    ) -> Result<()>;
}

#[derive(Default)]
struct StoreInner {
    users: HashMap<Uuid, User>,
    otps: Vec<OneTimeCode>,
}

/// In-memory store for development and testing. A single write guard
/// covers each compound operation, so the atomicity the trait promises
/// holds here too.
#[derive(Default)]
pub struct MemoryIdentityStore {
    inner: RwLock<StoreInner>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn purge_otps(otps: &mut Vec<OneTimeCode>, email: &str, otp_type: OtpType, now: DateTime<Utc>) {
    otps.retain(|otp| !(otp.email == email && (otp.otp_type == otp_type || otp.expires_at <= now)));
}

fn newest<'a, I>(candidates: I) -> Option<&'a OneTimeCode>
where
    I: Iterator<Item = &'a OneTimeCode>,
{
    candidates.max_by_key(|otp| otp.created_at)
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn create_user_with_otp(&self, user: NewUser, otp: NewOtp) -> Result<User> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::Conflict("User already exists".into()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            phone: user.phone,
            role: user.role,
            status: UserStatus::Deactivate,
            is_verified: false,
            image_url: user.image_url,
            push_tokens: user.push_tokens,
            created_at: Utc::now(),
        };

        inner.otps.push(OneTimeCode {
            id: Uuid::new_v4(),
            email: otp.email,
            code: otp.code,
            otp_type: otp.otp_type,
            expires_at: otp.expires_at,
            created_at: Utc::now(),
        });
        inner.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AuthError::NotFound("User not found".into()))?;
        user.password_hash = password_hash.to_owned();
        Ok(())
    }

    async fn update_status(&self, user_id: Uuid, status: UserStatus) -> Result<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AuthError::NotFound("User not found".into()))?;
        user.status = status;
        Ok(())
    }

    async fn add_push_token(&self, user_id: Uuid, token: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AuthError::NotFound("User not found".into()))?;
        if !user.push_tokens.iter().any(|t| t == token) {
            user.push_tokens.push(token.to_owned());
        }
        Ok(())
    }

    async fn remove_push_tokens(&self, user_id: Uuid, tokens: &[String]) -> Result<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AuthError::NotFound("User not found".into()))?;
        user.push_tokens.retain(|t| !tokens.contains(t));
        Ok(())
    }

    async fn create_otp(&self, otp: NewOtp) -> Result<OneTimeCode> {
        let mut inner = self.inner.write().await;
        let otp = OneTimeCode {
            id: Uuid::new_v4(),
            email: otp.email,
            code: otp.code,
            otp_type: otp.otp_type,
            expires_at: otp.expires_at,
            created_at: Utc::now(),
        };
        inner.otps.push(otp.clone());
        Ok(otp)
    }

    async fn find_valid_otp(
        &self,
        email: &str,
        code: &str,
        otp_type: OtpType,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>> {
        let inner = self.inner.read().await;
        Ok(newest(inner.otps.iter().filter(|otp| {
            otp.email == email
                && otp.code == code
                && otp.otp_type == otp_type
                && otp.expires_at > now
        }))
        .cloned())
    }

    async fn find_valid_otp_by_code(
        &self,
        code: &str,
        otp_type: OtpType,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>> {
        let inner = self.inner.read().await;
        Ok(newest(
            inner
                .otps
                .iter()
                .filter(|otp| otp.code == code && otp.otp_type == otp_type && otp.expires_at > now),
        )
        .cloned())
    }

    async fn mark_verified_and_purge_otps(
        &self,
        email: &str,
        otp_type: OtpType,
        now: DateTime<Utc>,
    ) -> Result<User> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .values_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| AuthError::NotFound("User not found".into()))?;
        user.is_verified = true;
        let user = user.clone();
        purge_otps(&mut inner.otps, email, otp_type, now);
        Ok(user)
    }

    async fn reset_password_and_purge_otps(
        &self,
        email: &str,
        password_hash: &str,
        otp_type: OtpType,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .values_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| AuthError::NotFound("User not found".into()))?;
        user.password_hash = password_hash.to_owned();
        purge_otps(&mut inner.otps, email, otp_type, now);
        Ok(())
    }
}

#[cfg(test)]
impl MemoryIdentityStore {
    /// Test-only inspection of the OTP rows for an email.
    pub async fn otps_for(&self, email: &str) -> Vec<OneTimeCode> {
        let inner = self.inner.read().await;
        inner
            .otps
            .iter()
            .filter(|otp| otp.email == email)
            .cloned()
            .collect()
    }
}
