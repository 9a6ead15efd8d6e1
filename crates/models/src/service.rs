//! Service listings. `average_rating` is not stored; it is derived from
//! the `review` rows on every read.
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::{catalog, profile, review};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: String,
    pub city: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Owner,
    Reviews,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Owner => Entity::belongs_to(profile::Entity)
                .from(Column::UserId)
                .to(profile::Column::Id)
                .into(),
            Relation::Reviews => Entity::has_many(review::Entity).into(),
        }
    }
}

impl Related<profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Column values written on create and update.
#[derive(Clone, Debug, PartialEq)]
pub struct Fields {
    pub title: String,
    pub description: String,
    pub category: String,
    pub city: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub image_url: Option<String>,
}

impl Fields {
    fn check(&self) -> Result<(), ModelError> {
        if self.title.trim().is_empty() {
            return Err(ModelError::Validation("title required".into()));
        }
        if !catalog::is_category(&self.category) {
            return Err(ModelError::Validation(format!("unknown category '{}'", self.category)));
        }
        if !catalog::is_city(&self.city) {
            return Err(ModelError::Validation(format!("unknown city '{}'", self.city)));
        }
        if !self.contact_email.contains('@') {
            return Err(ModelError::Validation("invalid contact email".into()));
        }
        Ok(())
    }
}

pub async fn create(db: &DatabaseConnection, owner: Uuid, fields: Fields) -> Result<Model, ModelError> {
    fields.check()?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(owner),
        title: Set(fields.title),
        description: Set(fields.description),
        category: Set(fields.category),
        city: Set(fields.city),
        contact_email: Set(fields.contact_email),
        contact_phone: Set(fields.contact_phone),
        image_url: Set(fields.image_url),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

/// Update a listing; the statement only matches rows owned by `owner`.
pub async fn update_owned(db: &DatabaseConnection, id: Uuid, owner: Uuid, fields: Fields) -> Result<Model, ModelError> {
    fields.check()?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = Entity::update_many()
        .col_expr(Column::Title, Expr::value(fields.title))
        .col_expr(Column::Description, Expr::value(fields.description))
        .col_expr(Column::Category, Expr::value(fields.category))
        .col_expr(Column::City, Expr::value(fields.city))
        .col_expr(Column::ContactEmail, Expr::value(fields.contact_email))
        .col_expr(Column::ContactPhone, Expr::value(fields.contact_phone))
        .col_expr(Column::ImageUrl, Expr::value(fields.image_url))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(id))
        .filter(Column::UserId.eq(owner))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ModelError::NotFound(format!("service {id}")));
    }
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ModelError::NotFound(format!("service {id}")))
}

/// Delete a listing owned by `owner`. Reviews and requests cascade.
pub async fn delete_owned(db: &DatabaseConnection, id: Uuid, owner: Uuid) -> Result<(), ModelError> {
    let res = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::UserId.eq(owner))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ModelError::NotFound(format!("service {id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Fields {
        Fields {
            title: "Logo design".into(),
            description: "Clean vector logos for small businesses".into(),
            category: "design".into(),
            city: "berlin".into(),
            contact_email: "ana@example.com".into(),
            contact_phone: None,
            image_url: None,
        }
    }

    #[test]
    fn known_catalog_values_pass() {
        assert!(fields().check().is_ok());
    }

    #[test]
    fn unknown_category_or_city_is_rejected() {
        let f = Fields { category: "cooking".into(), ..fields() };
        assert!(matches!(f.check(), Err(ModelError::Validation(_))));
        let f = Fields { city: "atlantis".into(), ..fields() };
        assert!(matches!(f.check(), Err(ModelError::Validation(_))));
    }
}
