use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::domain::{AuthSession, AuthUser, Claims, Profile, ProfileUpdate, SignInInput, SignUpInput};
use super::errors::AuthError;
use super::repository::AuthRepository;
use crate::errors::{ServiceError, ValidationErrors};

const RESET_PURPOSE: &str = "reset";

/// Auth service configuration
#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub session_hours: i64,
    pub reset_link_minutes: i64,
    pub password_algorithm: String,
}

impl AuthSettings {
    pub fn from_config(cfg: &configs::AuthConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            session_hours: cfg.session_hours,
            reset_link_minutes: cfg.reset_link_minutes,
            password_algorithm: "argon2".into(),
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository + ?Sized> {
    repo: Arc<R>,
    cfg: AuthSettings,
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

impl<R: AuthRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthSettings) -> Self {
        Self { repo, cfg }
    }

    fn issue_token(&self, profile: &Profile, purpose: Option<&str>, ttl: chrono::Duration) -> Result<String, AuthError> {
        let exp = (chrono::Utc::now() + ttl).timestamp() as usize;
        let claims = Claims {
            sub: profile.id.to_string(),
            uid: profile.id.to_string(),
            email: profile.email.clone(),
            exp,
            purpose: purpose.map(str::to_string),
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()), &validation).map(|d| d.claims)
    }

    fn session_for(&self, profile: Profile) -> Result<AuthSession, AuthError> {
        let token = self.issue_token(&profile, None, chrono::Duration::hours(self.cfg.session_hours))?;
        Ok(AuthSession { user: AuthUser { id: profile.id, email: profile.email.clone() }, profile, token })
    }

    /// Register a new account with a hashed password and sign it in.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthSettings}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::SignUpInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthSettings { jwt_secret: "secret".into(), session_hours: 12, reset_link_minutes: 60, password_algorithm: "argon2".into() });
    /// let input = SignUpInput { email: "user@example.com".into(), password: "Secret1".into(), full_name: "Test User".into(), confirm_password: None };
    /// let session = tokio_test::block_on(svc.sign_up(input)).unwrap();
    /// assert_eq!(session.profile.full_name, "Test User");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn sign_up(&self, input: SignUpInput) -> Result<AuthSession, ServiceError> {
        let errs = input.validate();
        if !errs.is_empty() {
            return Err(ServiceError::Validation(errs));
        }
        if let Some(existing) = self.repo.find_profile_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict.into());
        }

        let hash = hash_password(&input.password)?;
        let profile = self
            .repo
            .create_account(&input.email, &input.full_name, hash, self.cfg.password_algorithm.clone())
            .await?;
        info!(user_id = %profile.id, email = %profile.email, "user_registered");
        Ok(self.session_for(profile)?)
    }

    /// Authenticate and issue a session token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthSettings}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{SignUpInput, SignInInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthSettings { jwt_secret: "secret".into(), session_hours: 12, reset_link_minutes: 60, password_algorithm: "argon2".into() });
    /// let _ = tokio_test::block_on(svc.sign_up(SignUpInput { email: "u@e.com".into(), password: "Passw0rd".into(), full_name: "Nia".into(), confirm_password: None }));
    /// let session = tokio_test::block_on(svc.sign_in(SignInInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn sign_in(&self, input: SignInInput) -> Result<AuthSession, ServiceError> {
        let profile = self
            .repo
            .find_profile_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo.get_credentials(profile.id).await?.ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized.into());
        }
        info!(user_id = %profile.id, "user_signed_in");
        Ok(self.session_for(profile)?)
    }

    /// Account id carried by a valid session token.
    pub fn verify_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let claims = self.decode_claims(token).map_err(|e| {
            debug!(error = %e, "token rejected");
            AuthError::Unauthorized
        })?;
        if claims.purpose.is_some() {
            return Err(AuthError::Unauthorized);
        }
        Uuid::parse_str(&claims.uid).map_err(|_| AuthError::Unauthorized)
    }

    /// Issue a reset token for `email`. Unknown addresses succeed with
    /// `None` so callers cannot tell which emails have accounts.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<Option<String>, ServiceError> {
        let Some(profile) = self.repo.find_profile_by_email(email).await? else {
            debug!("reset requested for unknown email");
            return Ok(None);
        };
        let token = self.issue_token(&profile, Some(RESET_PURPOSE), chrono::Duration::minutes(self.cfg.reset_link_minutes))?;
        info!(user_id = %profile.id, "password_reset_issued");
        Ok(Some(token))
    }

    #[instrument(skip(self, token, new_password))]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ServiceError> {
        if new_password.chars().count() < 6 {
            return Err(ServiceError::Validation(ValidationErrors::single(
                "password",
                "Password must be at least 6 characters",
            )));
        }
        let claims = match self.decode_claims(token) {
            Ok(c) if c.purpose.as_deref() == Some(RESET_PURPOSE) => c,
            Ok(_) => return Err(AuthError::ExpiredLink.into()),
            Err(e) => {
                if matches!(e.kind(), ErrorKind::ExpiredSignature) {
                    debug!("reset token expired");
                }
                return Err(AuthError::ExpiredLink.into());
            }
        };
        let user_id = Uuid::parse_str(&claims.uid).map_err(|_| AuthError::ExpiredLink)?;
        if self.repo.find_profile(user_id).await?.is_none() {
            return Err(AuthError::ExpiredLink.into());
        }
        self.repo.upsert_password(user_id, hash_password(new_password)?, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user_id, "password_reset");
        Ok(())
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<Profile, ServiceError> {
        self.repo.find_profile(id).await?.ok_or_else(|| ServiceError::not_found("profile"))
    }

    /// Update a profile; only its owner may do so.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, actor: Uuid, id: Uuid, update: ProfileUpdate) -> Result<Profile, ServiceError> {
        if actor != id {
            return Err(ServiceError::Permission("profiles can only be edited by their owner".into()));
        }
        let mut errs = ValidationErrors::new();
        errs.check(update.full_name.trim().chars().count() >= 2, "full_name", "Full name must be at least 2 characters");
        errs.into_result()?;
        Ok(self.repo.update_profile(id, &update.full_name, update.avatar_url).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> AuthService<MockAuthRepository> {
        AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthSettings { jwt_secret: "test-secret".into(), session_hours: 12, reset_link_minutes: 60, password_algorithm: "argon2".into() },
        )
    }

    fn sign_up_input(email: &str) -> SignUpInput {
        SignUpInput { email: email.into(), password: "hunter22".into(), full_name: "Ada Lovelace".into(), confirm_password: Some("hunter22".into()) }
    }

    #[tokio::test]
    async fn sign_up_validates_every_field() {
        let bad = SignUpInput { email: "ada".into(), password: "123".into(), full_name: "A".into(), confirm_password: Some("1234".into()) };
        match svc().sign_up(bad).await {
            Err(ServiceError::Validation(v)) => {
                for f in ["email", "password", "full_name", "confirm_password"] {
                    assert!(v.has(f), "missing {f}");
                }
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let svc = svc();
        svc.sign_up(sign_up_input("ada@example.com")).await.unwrap();
        let err = svc.sign_up(sign_up_input("ADA@example.com")).await;
        assert!(matches!(err, Err(ServiceError::Auth(AuthError::Conflict))));
    }

    #[tokio::test]
    async fn failed_account_write_leaves_email_free() {
        let svc = svc();
        svc.repo.set_reject_accounts(true);
        let err = svc.sign_up(sign_up_input("ada@example.com")).await;
        assert!(matches!(err, Err(ServiceError::Auth(AuthError::Repository(_)))));
        assert!(svc.repo.find_profile_by_email("ada@example.com").await.unwrap().is_none());

        svc.repo.set_reject_accounts(false);
        let created = svc.sign_up(sign_up_input("ada@example.com")).await.unwrap();
        let signed_in = svc.sign_in(SignInInput { email: "ada@example.com".into(), password: "hunter22".into() }).await.unwrap();
        assert_eq!(signed_in.user.id, created.user.id);
    }

    #[tokio::test]
    async fn sign_in_round_trip_and_token_verification() {
        let svc = svc();
        let created = svc.sign_up(sign_up_input("ada@example.com")).await.unwrap();
        let session = svc.sign_in(SignInInput { email: "ada@example.com".into(), password: "hunter22".into() }).await.unwrap();
        assert_eq!(session.user.id, created.user.id);
        assert_eq!(svc.verify_token(&session.token).unwrap(), created.user.id);

        let wrong = svc.sign_in(SignInInput { email: "ada@example.com".into(), password: "nope!!".into() }).await;
        assert!(matches!(wrong, Err(ServiceError::Auth(AuthError::Unauthorized))));
        let unknown = svc.sign_in(SignInInput { email: "bob@example.com".into(), password: "hunter22".into() }).await;
        assert!(matches!(unknown, Err(ServiceError::Auth(AuthError::Unauthorized))));
        assert!(svc.verify_token("garbage").is_err());
    }

    #[tokio::test]
    async fn password_reset_flow() {
        let svc = svc();
        let created = svc.sign_up(sign_up_input("ada@example.com")).await.unwrap();
        assert_eq!(svc.request_password_reset("nobody@example.com").await.unwrap(), None);

        let token = svc.request_password_reset("ada@example.com").await.unwrap().unwrap();
        // reset tokens are not session tokens
        assert!(svc.verify_token(&token).is_err());
        // session tokens are not reset tokens
        let err = svc.reset_password(&created.token, "newpass1").await;
        assert!(matches!(err, Err(ServiceError::Auth(AuthError::ExpiredLink))));

        svc.reset_password(&token, "newpass1").await.unwrap();
        assert!(svc.sign_in(SignInInput { email: "ada@example.com".into(), password: "newpass1".into() }).await.is_ok());
        assert!(svc.sign_in(SignInInput { email: "ada@example.com".into(), password: "hunter22".into() }).await.is_err());
    }

    #[tokio::test]
    async fn expired_reset_link_is_rejected() {
        let mut svc = svc();
        svc.cfg.reset_link_minutes = -5;
        svc.sign_up(sign_up_input("ada@example.com")).await.unwrap();
        let token = svc.request_password_reset("ada@example.com").await.unwrap().unwrap();
        let err = svc.reset_password(&token, "newpass1").await;
        assert!(matches!(err, Err(ServiceError::Auth(AuthError::ExpiredLink))));
    }

    #[tokio::test]
    async fn profile_is_owner_only() {
        let svc = svc();
        let s = svc.sign_up(sign_up_input("ada@example.com")).await.unwrap();
        let update = ProfileUpdate { full_name: "Ada King".into(), avatar_url: Some("/service-images/a.png".into()) };
        let denied = svc.update_profile(Uuid::new_v4(), s.user.id, update.clone()).await;
        assert!(matches!(denied, Err(ServiceError::Permission(_))));
        let p = svc.update_profile(s.user.id, s.user.id, update).await.unwrap();
        assert_eq!(p.full_name, "Ada King");
        assert_eq!(svc.get_profile(s.user.id).await.unwrap().avatar_url.as_deref(), Some("/service-images/a.png"));
        assert!(matches!(svc.get_profile(Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
    }
}
