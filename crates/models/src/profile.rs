use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// Public profile of an account. `id` is the auth identity.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    pub avatar_url: Option<String>,
    #[sea_orm(unique)]
    pub email: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Services,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Services => Entity::has_many(crate::service::Entity).into(),
        }
    }
}

impl Related<crate::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Services.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create<C: ConnectionTrait>(db: &C, id: Uuid, email: &str, full_name: &str) -> Result<Model, ModelError> {
    if !email.contains('@') {
        return Err(ModelError::Validation("invalid email".into()));
    }
    if full_name.trim().is_empty() {
        return Err(ModelError::Validation("full name required".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(id),
        full_name: Set(full_name.trim().to_string()),
        avatar_url: Set(None),
        email: Set(email.trim().to_lowercase()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

/// Profile and its password hash in one transaction; a failed credential
/// write leaves no profile behind.
pub async fn register(
    db: &DatabaseConnection,
    email: &str,
    full_name: &str,
    password_hash: String,
    algorithm: &str,
) -> Result<Model, ModelError> {
    let txn = db.begin().await?;
    let created = create(&txn, Uuid::new_v4(), email, full_name).await?;
    crate::user_credentials::upsert_password(&txn, created.id, password_hash, algorithm).await?;
    txn.commit().await?;
    Ok(created)
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find()
        .filter(Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await?)
}

pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    full_name: &str,
    avatar_url: Option<String>,
) -> Result<Model, ModelError> {
    if full_name.trim().is_empty() {
        return Err(ModelError::Validation("full name required".into()));
    }
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ModelError::NotFound(format!("profile {id}")))?
        .into();
    found.full_name = Set(full_name.trim().to_string());
    found.avatar_url = Set(avatar_url.filter(|u| !u.trim().is_empty()));
    found.updated_at = Set(Utc::now().into());
    Ok(found.update(db).await?)
}
