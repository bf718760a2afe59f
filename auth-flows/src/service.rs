use crate::config::AuthConfig;
use crate::emails;
use crate::error::{AuthError, Result};
use crate::mailer::Mailer;
use crate::models::*;
use crate::otp;
use crate::password::PasswordHasher;
use crate::repository::IdentityStore;
use crate::token::TokenIssuer;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Orchestrates the identity lifecycle flows on top of the store, the
/// credential hasher, the token issuer, and the mail port. Every
/// multi-write flow goes through a single atomic store call wrapped in
/// the configured transaction timeout; email dispatch happens after the
/// commit, detached from the request path.
pub struct AuthService {
    store: Arc<dyn IdentityStore>,
    mailer: Arc<dyn Mailer>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn IdentityStore>, mailer: Arc<dyn Mailer>, config: AuthConfig) -> Self {
        Self {
            store,
            mailer,
            hasher: PasswordHasher::new(config.bcrypt_cost),
            tokens: TokenIssuer::new(&config),
            config,
        }
    }

    /// Registers a new user and issues their email verification code in
    /// one transaction, then dispatches the verification mail
    /// best-effort.
    pub async fn register(&self, payload: RegisterPayload) -> Result<SanitizedUser> {
        let email = normalize_email(&payload.email);
        self.validate_password(&payload.password)?;

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict("User already exists".into()));
        }

        let password_hash = self.hasher.hash(&payload.password)?;
        let code = otp::generate_code(self.config.otp_digits, self.config.otp_ttl_minutes);

        let new_user = NewUser {
            email: email.clone(),
            password_hash,
            name: payload.name,
            phone: payload.phone,
            role: payload.role,
            image_url: payload.image_url,
            push_tokens: payload.push_token.into_iter().collect(),
        };
        let new_otp = NewOtp {
            email: email.clone(),
            code: code.code.clone(),
            otp_type: OtpType::VerifyEmail,
            expires_at: code.expires_at,
        };

        let user = self
            .with_txn_timeout(self.store.create_user_with_otp(new_user, new_otp))
            .await?;

        info!(user_id = %user.id, "user registered");
        self.dispatch_email(email, "Verify Your Email", emails::verification_email(&code.code));

        Ok(user.into())
    }

    /// Authenticates credentials and returns an access/refresh pair.
    /// Order of gates: account status, then password, then verification.
    pub async fn login(&self, payload: LoginPayload) -> Result<LoginResponse> {
        let email = normalize_email(&payload.email);
        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".into()))?;

        if user.status != UserStatus::Active {
            return Err(AuthError::Forbidden(format!("Account is {}", user.status)));
        }

        if !self.hasher.verify(&payload.password, &user.password_hash)? {
            return Err(AuthError::Unauthorized("Incorrect password".into()));
        }

        if !user.is_verified {
            return Err(AuthError::Forbidden("Email is not verified".into()));
        }

        if let Some(token) = payload.push_token.as_deref() {
            self.store.add_push_token(user.id, token).await?;
        }

        let access_token = self.tokens.issue_access_token(&user)?;
        let refresh_token = self.tokens.issue_refresh_token(user.id)?;

        info!(user_id = %user.id, "user logged in");
        Ok(LoginResponse {
            access_token,
            refresh_token,
            user: user.into(),
        })
    }

    /// Consumes a one-time code: marks the user verified and purges every
    /// same-type or expired code for that email in one transaction, then
    /// hands back a fresh token pair.
    pub async fn verify_code(&self, payload: VerifyCodePayload) -> Result<VerifyCodeResponse> {
        let email = normalize_email(&payload.email);
        let now = Utc::now();

        if self
            .store
            .find_valid_otp(&email, &payload.code, payload.otp_type, now)
            .await?
            .is_none()
        {
            return Err(AuthError::BadRequest("Invalid or expired code".into()));
        }

        let user = self
            .with_txn_timeout(
                self.store
                    .mark_verified_and_purge_otps(&email, payload.otp_type, now),
            )
            .await?;

        let access_token = self.tokens.issue_access_token(&user)?;
        let refresh_token = self.tokens.issue_refresh_token(user.id)?;

        info!(user_id = %user.id, otp_type = ?payload.otp_type, "one-time code consumed");
        Ok(VerifyCodeResponse {
            message: "Code verified successfully".into(),
            access_token,
            refresh_token,
        })
    }

    /// Issues a password-reset code and dispatches it best-effort. Note:
    /// an unknown email surfaces as NotFound, which reveals whether the
    /// address is registered.
    pub async fn forgot_password(&self, payload: ForgotPasswordPayload) -> Result<MessageResponse> {
        let email = normalize_email(&payload.email);
        if self.store.find_user_by_email(&email).await?.is_none() {
            return Err(AuthError::NotFound("User not found".into()));
        }

        let code = otp::generate_code(self.config.otp_digits, self.config.otp_ttl_minutes);
        self.store
            .create_otp(NewOtp {
                email: email.clone(),
                code: code.code.clone(),
                otp_type: OtpType::ResetPassword,
                expires_at: code.expires_at,
            })
            .await?;

        self.dispatch_email(
            email,
            "Reset Your Password",
            emails::password_reset_email(&code.code),
        );

        Ok(MessageResponse {
            message: "A reset code has been sent to your email".into(),
        })
    }

    /// Consumes a reset code (the code alone is the handle) and replaces
    /// the password, purging all reset codes for the email atomically.
    pub async fn reset_password(&self, payload: ResetPasswordPayload) -> Result<MessageResponse> {
        let now = Utc::now();
        let code = self
            .store
            .find_valid_otp_by_code(&payload.code, OtpType::ResetPassword, now)
            .await?
            .ok_or_else(|| AuthError::BadRequest("Invalid or expired code".into()))?;

        self.validate_password(&payload.new_password)?;
        let password_hash = self.hasher.hash(&payload.new_password)?;

        self.with_txn_timeout(self.store.reset_password_and_purge_otps(
            &code.email,
            &password_hash,
            OtpType::ResetPassword,
            now,
        ))
        .await?;

        info!(email = %code.email, "password reset");
        Ok(MessageResponse {
            message: "Password reset successfully".into(),
        })
    }

    /// Authenticated password change; single-row update, no transaction
    /// wrapper needed.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        payload: ChangePasswordPayload,
    ) -> Result<MessageResponse> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".into()))?;

        if !self
            .hasher
            .verify(&payload.old_password, &user.password_hash)?
        {
            return Err(AuthError::BadRequest("Old password is incorrect".into()));
        }

        self.validate_password(&payload.new_password)?;
        let password_hash = self.hasher.hash(&payload.new_password)?;
        self.store.update_password(user.id, &password_hash).await?;

        info!(user_id = %user.id, "password changed");
        Ok(MessageResponse {
            message: "Password changed successfully".into(),
        })
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<SanitizedUser> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .map(SanitizedUser::from)
            .ok_or_else(|| AuthError::NotFound("User not found".into()))
    }

    /// Verifies a refresh token and mints a new access token. The
    /// refresh token itself is not rotated.
    pub async fn refresh_token(&self, payload: RefreshTokenPayload) -> Result<RefreshTokenResponse> {
        let claims = self.tokens.verify_refresh_token(&payload.refresh_token)?;

        let user = self
            .store
            .find_user_by_id(claims.sub)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("User no longer exists".into()))?;

        let access_token = self.tokens.issue_access_token(&user)?;
        Ok(RefreshTokenResponse { access_token })
    }

    /// Removes delivery-rejected device tokens from a user's set; called
    /// by the push component when a provider reports dead registrations.
    pub async fn prune_push_tokens(&self, user_id: Uuid, tokens: &[String]) -> Result<()> {
        self.store.remove_push_tokens(user_id, tokens).await
    }

    fn validate_password(&self, password: &str) -> Result<()> {
        if password.len() < self.config.password_min_length {
            return Err(AuthError::BadRequest(format!(
                "Password must be at least {} characters",
                self.config.password_min_length
            )));
        }
        if self.config.password_require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(AuthError::BadRequest(
                "Password must contain an uppercase letter".into(),
            ));
        }
        if self.config.password_require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AuthError::BadRequest(
                "Password must contain a digit".into(),
            ));
        }
        if self.config.password_require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err(AuthError::BadRequest(
                "Password must contain a special character".into(),
            ));
        }
        Ok(())
    }

    async fn with_txn_timeout<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.config.txn_timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(AuthError::Timeout),
        }
    }

    /// Fire-and-forget: scheduled after the transaction commits, never
    /// awaited on the request path, failure only logged.
    fn dispatch_email(&self, to: String, subject: &'static str, html: String) {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            if let Err(err) = mailer.send(&to, subject, &html).await {
                warn!(recipient = %to, error = %err, "email dispatch failed");
            }
        });
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::MockMailer;
    use crate::repository::MemoryIdentityStore;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};
    use secrecy::SecretString;
    use std::time::Duration as StdDuration;

    fn test_config() -> AuthConfig {
        AuthConfig {
            access_secret: SecretString::new("access-secret-for-tests".into()),
            refresh_secret: SecretString::new("refresh-secret-for-tests".into()),
            access_ttl_minutes: 15,
            refresh_ttl_days: 30,
            bcrypt_cost: 4,
            otp_digits: 6,
            otp_ttl_minutes: 10,
            password_min_length: 8,
            password_require_uppercase: true,
            password_require_digit: true,
            password_require_special: true,
            txn_timeout: StdDuration::from_secs(10),
        }
    }

    fn quiet_mailer() -> Arc<MockMailer> {
        let mut mailer = MockMailer::new();
        mailer.expect_send().returning(|_, _, _| Ok(()));
        Arc::new(mailer)
    }

    fn service() -> (Arc<AuthService>, Arc<MemoryIdentityStore>) {
        let store = Arc::new(MemoryIdentityStore::new());
        let service = Arc::new(AuthService::new(
            store.clone(),
            quiet_mailer(),
            test_config(),
        ));
        (service, store)
    }

    fn register_payload(email: &str) -> RegisterPayload {
        RegisterPayload {
            name: "Test User".into(),
            email: email.into(),
            phone: "+8801712345678".into(),
            password: "P@ssw0rd1".into(),
            role: UserRole::Member,
            image_url: Some("https://cdn.example.com/avatar.png".into()),
            push_token: None,
        }
    }

    fn login_payload(email: &str, password: &str) -> LoginPayload {
        LoginPayload {
            email: email.into(),
            password: password.into(),
            push_token: None,
        }
    }

    async fn issued_code(store: &MemoryIdentityStore, email: &str, otp_type: OtpType) -> String {
        store
            .otps_for(email)
            .await
            .into_iter()
            .filter(|otp| otp.otp_type == otp_type)
            .max_by_key(|otp| otp.created_at)
            .map(|otp| otp.code)
            .expect("no code issued")
    }

    /// Registers, activates (admin transition), and verifies a user.
    async fn onboarded_user(
        service: &AuthService,
        store: &Arc<MemoryIdentityStore>,
        email: &str,
    ) -> Uuid {
        let user = service.register(register_payload(email)).await.unwrap();
        store
            .update_status(user.id, UserStatus::Active)
            .await
            .unwrap();
        let code = issued_code(store, email, OtpType::VerifyEmail).await;
        service
            .verify_code(VerifyCodePayload {
                email: email.into(),
                code,
                otp_type: OtpType::VerifyEmail,
            })
            .await
            .unwrap();
        user.id
    }

    #[tokio::test]
    async fn register_creates_unverified_user_with_code() {
        let (service, store) = service();

        let user = service.register(register_payload("a@x.com")).await.unwrap();
        assert!(!user.is_verified);
        assert_eq!(user.status, UserStatus::Deactivate);

        let codes = store.otps_for("a@x.com").await;
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].otp_type, OtpType::VerifyEmail);
        assert_eq!(codes[0].code.len(), 6);
        assert!(codes[0].expires_at > Utc::now());
    }

    #[tokio::test]
    async fn register_normalizes_email() {
        let (service, store) = service();
        service
            .register(register_payload("  Mixed.Case@X.COM "))
            .await
            .unwrap();

        assert!(store
            .find_user_by_email("mixed.case@x.com")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_conflict() {
        let (service, _) = service();
        service.register(register_payload("a@x.com")).await.unwrap();

        let err = service
            .register(register_payload("a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
    }

    #[tokio::test]
    async fn concurrent_registration_creates_one_row() {
        let (service, store) = service();

        let (first, second) = tokio::join!(
            service.register(register_payload("a@x.com")),
            service.register(register_payload("a@x.com")),
        );

        assert_eq!(
            [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
            1
        );
        assert!(store.find_user_by_email("a@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn password_policy_is_enforced() {
        let (service, _) = service();

        for bad in ["short1!", "nouppercase1!", "NoDigits!!", "NoSpecials11"] {
            let mut payload = register_payload("a@x.com");
            payload.password = bad.into();
            assert!(
                matches!(service.register(payload).await, Err(AuthError::BadRequest(_))),
                "accepted weak password {bad:?}"
            );
        }
    }

    #[tokio::test]
    async fn verify_code_flips_flag_purges_codes_and_issues_tokens() {
        let (service, store) = service();
        let user = service.register(register_payload("a@x.com")).await.unwrap();
        let code = issued_code(&store, "a@x.com", OtpType::VerifyEmail).await;

        let response = service
            .verify_code(VerifyCodePayload {
                email: "a@x.com".into(),
                code: code.clone(),
                otp_type: OtpType::VerifyEmail,
            })
            .await
            .unwrap();
        assert!(!response.access_token.is_empty());
        assert!(!response.refresh_token.is_empty());

        let user = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert!(user.is_verified);
        assert!(store.otps_for("a@x.com").await.is_empty());

        // Consumed codes can never be replayed.
        let err = service
            .verify_code(VerifyCodePayload {
                email: "a@x.com".into(),
                code,
                otp_type: OtpType::VerifyEmail,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::BadRequest(_)));
    }

    #[tokio::test]
    async fn expired_code_is_rejected() {
        let (service, store) = service();
        service.register(register_payload("a@x.com")).await.unwrap();
        store
            .create_otp(NewOtp {
                email: "a@x.com".into(),
                code: "999999".into(),
                otp_type: OtpType::VerifyEmail,
                expires_at: Utc::now() - Duration::minutes(1),
            })
            .await
            .unwrap();

        let err = service
            .verify_code(VerifyCodePayload {
                email: "a@x.com".into(),
                code: "999999".into(),
                otp_type: OtpType::VerifyEmail,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::BadRequest(_)));
    }

    #[tokio::test]
    async fn login_unknown_email_is_not_found() {
        let (service, _) = service();
        let err = service
            .login(login_payload("ghost@x.com", "P@ssw0rd1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn login_gates_on_status_before_password() {
        let (service, _) = service();
        service.register(register_payload("a@x.com")).await.unwrap();

        // Even the correct password cannot pass a deactivated account,
        // and the message carries the current status.
        let err = service
            .login(login_payload("a@x.com", "P@ssw0rd1"))
            .await
            .unwrap_err();
        match err {
            AuthError::Forbidden(message) => assert!(message.contains("DEACTIVATE")),
            other => panic!("expected Forbidden, got {other:?}"),
        }

        let err = service
            .login(login_payload("a@x.com", "wrong-password"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unverified_accounts() {
        let (service, store) = service();
        let user = service.register(register_payload("a@x.com")).await.unwrap();
        store
            .update_status(user.id, UserStatus::Active)
            .await
            .unwrap();

        let err = service
            .login(login_payload("a@x.com", "wrong-password"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));

        let err = service
            .login(login_payload("a@x.com", "P@ssw0rd1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));
    }

    #[tokio::test]
    async fn login_returns_tokens_and_upserts_push_token() {
        let (service, store) = service();
        let user_id = onboarded_user(&service, &store, "a@x.com").await;

        let response = service
            .login(LoginPayload {
                email: "a@x.com".into(),
                password: "P@ssw0rd1".into(),
                push_token: Some("device-1".into()),
            })
            .await
            .unwrap();

        assert!(!response.access_token.is_empty());
        assert!(!response.refresh_token.is_empty());
        assert_eq!(response.user.email, "a@x.com");

        let user = store.find_user_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(user.push_tokens, vec!["device-1"]);
    }

    #[tokio::test]
    async fn forgot_password_requires_known_email() {
        let (service, _) = service();
        let err = service
            .forgot_password(ForgotPasswordPayload {
                email: "ghost@x.com".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn reset_flow_replaces_password_and_consumes_code() {
        let (service, store) = service();
        onboarded_user(&service, &store, "a@x.com").await;

        service
            .forgot_password(ForgotPasswordPayload {
                email: "a@x.com".into(),
            })
            .await
            .unwrap();
        let code = issued_code(&store, "a@x.com", OtpType::ResetPassword).await;

        service
            .reset_password(ResetPasswordPayload {
                code: code.clone(),
                new_password: "NewP@ss1".into(),
            })
            .await
            .unwrap();

        // Old password is dead, new one works.
        let err = service
            .login(login_payload("a@x.com", "P@ssw0rd1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
        service
            .login(login_payload("a@x.com", "NewP@ss1"))
            .await
            .unwrap();

        // The reset code was purged with the update.
        let err = service
            .reset_password(ResetPasswordPayload {
                code,
                new_password: "Another1!".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::BadRequest(_)));
    }

    #[tokio::test]
    async fn change_password_rejects_wrong_old_password() {
        let (service, store) = service();
        let user_id = onboarded_user(&service, &store, "a@x.com").await;
        let hash_before = store
            .find_user_by_id(user_id)
            .await
            .unwrap()
            .unwrap()
            .password_hash;

        let err = service
            .change_password(
                user_id,
                ChangePasswordPayload {
                    old_password: "wrong-password".into(),
                    new_password: "NewP@ss1".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::BadRequest(_)));

        let hash_after = store
            .find_user_by_id(user_id)
            .await
            .unwrap()
            .unwrap()
            .password_hash;
        assert_eq!(hash_before, hash_after);
    }

    #[tokio::test]
    async fn change_password_with_correct_old_password() {
        let (service, store) = service();
        let user_id = onboarded_user(&service, &store, "a@x.com").await;

        service
            .change_password(
                user_id,
                ChangePasswordPayload {
                    old_password: "P@ssw0rd1".into(),
                    new_password: "NewP@ss1".into(),
                },
            )
            .await
            .unwrap();

        service
            .login(login_payload("a@x.com", "NewP@ss1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn refresh_token_mints_a_new_access_token() {
        let (service, store) = service();
        onboarded_user(&service, &store, "a@x.com").await;
        let login = service
            .login(login_payload("a@x.com", "P@ssw0rd1"))
            .await
            .unwrap();

        let refreshed = service
            .refresh_token(RefreshTokenPayload {
                refresh_token: login.refresh_token.clone(),
            })
            .await
            .unwrap();
        assert!(!refreshed.access_token.is_empty());

        let mut tampered = login.refresh_token;
        tampered.push('x');
        let err = service
            .refresh_token(RefreshTokenPayload {
                refresh_token: tampered,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn refresh_token_for_missing_user_is_unauthorized() {
        let (service, _) = service();
        let issuer = crate::token::TokenIssuer::new(&test_config());
        let orphan = issuer.issue_refresh_token(Uuid::new_v4()).unwrap();

        let err = service
            .refresh_token(RefreshTokenPayload {
                refresh_token: orphan,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn get_profile_returns_sanitized_projection() {
        let (service, store) = service();
        let user_id = onboarded_user(&service, &store, "a@x.com").await;

        let profile = service.get_profile(user_id).await.unwrap();
        assert_eq!(profile.email, "a@x.com");
        assert!(profile.is_verified);

        let err = service.get_profile(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn prune_push_tokens_drops_dead_registrations() {
        let (service, store) = service();
        let user_id = onboarded_user(&service, &store, "a@x.com").await;
        store.add_push_token(user_id, "dead").await.unwrap();
        store.add_push_token(user_id, "alive").await.unwrap();

        service
            .prune_push_tokens(user_id, &["dead".into()])
            .await
            .unwrap();

        let user = store.find_user_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(user.push_tokens, vec!["alive"]);
    }

    /// Store whose compound write never completes; only the lookups the
    /// register flow needs are live.
    struct StalledStore;

    #[async_trait]
    impl IdentityStore for StalledStore {
        async fn find_user_by_email(&self, _email: &str) -> crate::Result<Option<User>> {
            Ok(None)
        }
        async fn find_user_by_id(&self, _id: Uuid) -> crate::Result<Option<User>> {
            Ok(None)
        }
        async fn create_user_with_otp(&self, _user: NewUser, _otp: NewOtp) -> crate::Result<User> {
            tokio::time::sleep(StdDuration::from_secs(3600)).await;
            unreachable!()
        }
        async fn update_password(&self, _: Uuid, _: &str) -> crate::Result<()> {
            unreachable!()
        }
        async fn update_status(&self, _: Uuid, _: UserStatus) -> crate::Result<()> {
            unreachable!()
        }
        async fn add_push_token(&self, _: Uuid, _: &str) -> crate::Result<()> {
            unreachable!()
        }
        async fn remove_push_tokens(&self, _: Uuid, _: &[String]) -> crate::Result<()> {
            unreachable!()
        }
        async fn create_otp(&self, _: NewOtp) -> crate::Result<OneTimeCode> {
            unreachable!()
        }
        async fn find_valid_otp(
            &self,
            _: &str,
            _: &str,
            _: OtpType,
            _: DateTime<Utc>,
        ) -> crate::Result<Option<OneTimeCode>> {
            unreachable!()
        }
        async fn find_valid_otp_by_code(
            &self,
            _: &str,
            _: OtpType,
            _: DateTime<Utc>,
        ) -> crate::Result<Option<OneTimeCode>> {
            unreachable!()
        }
        async fn mark_verified_and_purge_otps(
            &self,
            _: &str,
            _: OtpType,
            _: DateTime<Utc>,
        ) -> crate::Result<User> {
            unreachable!()
        }
        async fn reset_password_and_purge_otps(
            &self,
            _: &str,
            _: &str,
            _: OtpType,
            _: DateTime<Utc>,
        ) -> crate::Result<()> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn stalled_transaction_surfaces_timeout() {
        let mut config = test_config();
        config.txn_timeout = StdDuration::from_millis(50);
        let service = AuthService::new(Arc::new(StalledStore), quiet_mailer(), config);

        let err = service
            .register(register_payload("a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Timeout));
    }
}
