use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::domain::{Credentials, Profile};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use models::errors::ModelError;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn repo_err(e: ModelError) -> AuthError {
    match e {
        ModelError::Validation(msg) => AuthError::Validation(msg),
        ModelError::NotFound(_) => AuthError::NotFound,
        ModelError::Db(msg) => AuthError::Repository(msg),
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, AuthError> {
        let found = models::profile::find_by_email(&self.db, email).await.map_err(repo_err)?;
        Ok(found.map(Profile::from))
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, AuthError> {
        use sea_orm::EntityTrait;
        let found = models::profile::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(found.map(Profile::from))
    }

    async fn create_account(
        &self,
        email: &str,
        full_name: &str,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<Profile, AuthError> {
        let created = models::profile::register(&self.db, email, full_name, password_hash, &password_algorithm)
            .await
            .map_err(|e| match e {
                // unique index on profile.email
                ModelError::Db(msg) if msg.contains("duplicate key") => AuthError::Conflict,
                other => repo_err(other),
            })?;
        Ok(created.into())
    }

    async fn update_profile(&self, id: Uuid, full_name: &str, avatar_url: Option<String>) -> Result<Profile, AuthError> {
        let updated = models::profile::update(&self.db, id, full_name, avatar_url).await.map_err(repo_err)?;
        Ok(updated.into())
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = models::user_credentials::find_by_user(&self.db, user_id).await.map_err(repo_err)?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = models::user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm)
            .await
            .map_err(repo_err)?;
        Ok(Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm })
    }
}
