//! Client-side session state: who is signed in, published to subscribers.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use super::domain::{AuthSession, SignInInput, SignUpInput};
use super::repository::AuthRepository;
use super::service::AuthService;
use crate::errors::ServiceError;
use crate::notify::{Notice, Notifier};

/// Anything that can open and close sessions: the in-process service or
/// the remote API.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, input: SignUpInput) -> Result<AuthSession, ServiceError>;
    async fn sign_in(&self, input: SignInInput) -> Result<AuthSession, ServiceError>;
    async fn sign_out(&self, session: &AuthSession) -> Result<(), ServiceError>;
}

#[async_trait]
impl<R: AuthRepository + ?Sized> AuthProvider for AuthService<R> {
    async fn sign_up(&self, input: SignUpInput) -> Result<AuthSession, ServiceError> {
        AuthService::sign_up(self, input).await
    }

    async fn sign_in(&self, input: SignInInput) -> Result<AuthSession, ServiceError> {
        AuthService::sign_in(self, input).await
    }

    // tokens are stateless; dropping the session client-side is enough
    async fn sign_out(&self, _session: &AuthSession) -> Result<(), ServiceError> {
        Ok(())
    }
}

pub struct SessionStore<P: AuthProvider + ?Sized, N: Notifier + ?Sized> {
    provider: Arc<P>,
    notifier: Arc<N>,
    state: watch::Sender<Option<AuthSession>>,
}

impl<P: AuthProvider + ?Sized, N: Notifier + ?Sized> SessionStore<P, N> {
    pub fn new(provider: Arc<P>, notifier: Arc<N>) -> Self {
        let (state, _) = watch::channel(None);
        Self { provider, notifier, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AuthSession>> {
        self.state.subscribe()
    }

    pub fn current(&self) -> Option<AuthSession> {
        self.state.borrow().clone()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.state.borrow().as_ref().map(|s| s.user.id)
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().as_ref().map(|s| s.token.clone())
    }

    pub async fn sign_up(&self, input: SignUpInput) -> Result<AuthSession, ServiceError> {
        match self.provider.sign_up(input).await {
            Ok(session) => {
                info!(user_id = %session.user.id, "session opened");
                self.state.send_replace(Some(session.clone()));
                self.notifier
                    .notify(Notice::success("Account created", "Your account has been created successfully."));
                Ok(session)
            }
            Err(e) => {
                self.notifier.notify(Notice::error("Sign up failed", e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn sign_in(&self, input: SignInInput) -> Result<AuthSession, ServiceError> {
        match self.provider.sign_in(input).await {
            Ok(session) => {
                info!(user_id = %session.user.id, "session opened");
                self.state.send_replace(Some(session.clone()));
                self.notifier.notify(Notice::success("Welcome back!", "You have successfully signed in."));
                Ok(session)
            }
            Err(e) => {
                self.notifier.notify(Notice::error("Sign in failed", e.to_string()));
                Err(e)
            }
        }
    }

    /// Close the current session. Signing out with no session is a no-op.
    pub async fn sign_out(&self) -> Result<(), ServiceError> {
        let Some(session) = self.current() else {
            return Ok(());
        };
        match self.provider.sign_out(&session).await {
            Ok(()) => {
                self.state.send_replace(None);
                self.notifier.notify(Notice::success("Signed out", "You have been signed out."));
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(Notice::error("Sign out failed", e.to_string()));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use crate::auth::service::AuthSettings;
    use crate::notify::{NoticeLevel, RecordingNotifier};

    fn store() -> (SessionStore<AuthService<MockAuthRepository>, RecordingNotifier>, Arc<RecordingNotifier>) {
        let svc = AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthSettings { jwt_secret: "s".into(), session_hours: 1, reset_link_minutes: 10, password_algorithm: "argon2".into() },
        );
        let notifier = Arc::new(RecordingNotifier::default());
        (SessionStore::new(Arc::new(svc), notifier.clone()), notifier)
    }

    fn sign_up() -> SignUpInput {
        SignUpInput { email: "kofi@example.com".into(), password: "secret1".into(), full_name: "Kofi".into(), confirm_password: None }
    }

    #[tokio::test]
    async fn sign_up_publishes_session_and_notifies() {
        let (store, notes) = store();
        let mut rx = store.subscribe();
        let s = store.sign_up(sign_up()).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().map(|x| x.user.id), Some(s.user.id));
        assert_eq!(store.user_id(), Some(s.user.id));
        let taken = notes.take();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].level, NoticeLevel::Success);
        assert_eq!(taken[0].title, "Account created");
    }

    #[tokio::test]
    async fn failed_sign_in_keeps_state_and_notifies_once() {
        let (store, notes) = store();
        store.sign_up(sign_up()).await.unwrap();
        store.sign_out().await.unwrap();
        notes.take();

        let err = store.sign_in(SignInInput { email: "kofi@example.com".into(), password: "wrong!!".into() }).await;
        assert!(err.is_err());
        assert!(store.current().is_none());
        assert_eq!(notes.errors(), 1);
        assert_eq!(notes.notices()[0].title, "Sign in failed");

        store.sign_in(SignInInput { email: "kofi@example.com".into(), password: "secret1".into() }).await.unwrap();
        assert!(store.token().is_some());
    }

    #[tokio::test]
    async fn sign_out_clears_session() {
        let (store, notes) = store();
        store.sign_out().await.unwrap();
        assert!(notes.notices().is_empty());
        store.sign_up(sign_up()).await.unwrap();
        store.sign_out().await.unwrap();
        assert!(store.current().is_none());
        assert_eq!(notes.notices().last().map(|n| n.title.clone()), Some("Signed out".to_string()));
    }
}
