use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{Credentials, Profile};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, AuthError>;
    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, AuthError>;
    /// Create the profile together with its credentials. Either both are
    /// stored or neither is; a taken email is `Conflict`.
    async fn create_account(
        &self,
        email: &str,
        full_name: &str,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<Profile, AuthError>;
    async fn update_profile(&self, id: Uuid, full_name: &str, avatar_url: Option<String>) -> Result<Profile, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        profiles: Mutex<HashMap<Uuid, Profile>>,
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
        reject_accounts: AtomicBool,
    }

    impl MockAuthRepository {
        /// Make account creation fail as a storage error would.
        pub fn set_reject_accounts(&self, reject: bool) {
            self.reject_accounts.store(reject, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, AuthError> {
            let key = email.trim().to_lowercase();
            let profiles = self.profiles.lock().unwrap();
            Ok(profiles.values().find(|p| p.email == key).cloned())
        }

        async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, AuthError> {
            Ok(self.profiles.lock().unwrap().get(&id).cloned())
        }

        async fn create_account(
            &self,
            email: &str,
            full_name: &str,
            password_hash: String,
            password_algorithm: String,
        ) -> Result<Profile, AuthError> {
            let key = email.trim().to_lowercase();
            let mut profiles = self.profiles.lock().unwrap();
            if profiles.values().any(|p| p.email == key) {
                return Err(AuthError::Conflict);
            }
            if self.reject_accounts.load(Ordering::SeqCst) {
                return Err(AuthError::Repository("credentials insert failed".into()));
            }
            let profile = Profile { id: Uuid::new_v4(), full_name: full_name.trim().to_string(), avatar_url: None, email: key };
            self.creds
                .lock()
                .unwrap()
                .insert(profile.id, Credentials { user_id: profile.id, password_hash, password_algorithm });
            profiles.insert(profile.id, profile.clone());
            Ok(profile)
        }

        async fn update_profile(&self, id: Uuid, full_name: &str, avatar_url: Option<String>) -> Result<Profile, AuthError> {
            let mut profiles = self.profiles.lock().unwrap();
            let p = profiles.get_mut(&id).ok_or(AuthError::NotFound)?;
            p.full_name = full_name.trim().to_string();
            p.avatar_url = avatar_url.filter(|u| !u.trim().is_empty());
            Ok(p.clone())
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            let mut creds = self.creds.lock().unwrap();
            let c = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, c.clone());
            Ok(c)
        }
    }
}
