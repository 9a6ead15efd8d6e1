use std::collections::HashMap;

use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    AccessMode, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, IsolationLevel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::listing::domain::{ListingForm, ListingPage, ServiceListing};
use crate::listing::query::{CountMode, QueryDescription, SortField};
use crate::listing::repository::ListingRepository;
use crate::rating;
use crate::requests::{RequestForm, RequestRepository, ServiceRequest};
use crate::reviews::{Review, ReviewForm, ReviewRepository};
use models::{review, service};

/// Postgres-backed marketplace repository.
pub struct SeaOrmListingRepository {
    pub db: DatabaseConnection,
}

fn apply(query: &QueryDescription) -> Select<service::Entity> {
    let mut select = service::Entity::find();
    if let Some(owner) = query.owner {
        select = select.filter(service::Column::UserId.eq(owner));
    }
    if let Some(category) = &query.category {
        select = select.filter(service::Column::Category.eq(category.clone()));
    }
    if let Some(city) = &query.city {
        select = select.filter(service::Column::City.eq(city.clone()));
    }
    if let Some(pattern) = query.like_pattern() {
        let like = |col: service::Column| {
            Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern.clone()).escape('\\'))
        };
        select = select.filter(
            Condition::any()
                .add(like(service::Column::Title))
                .add(like(service::Column::Description)),
        );
    }
    select
}

fn order(mut select: Select<service::Entity>, query: &QueryDescription) -> Select<service::Entity> {
    for key in &query.sort {
        let col = match key.field {
            SortField::CreatedAt => service::Column::CreatedAt,
            SortField::Id => service::Column::Id,
        };
        select = if key.descending { select.order_by_desc(col) } else { select.order_by_asc(col) };
    }
    select
}

/// Average rating per listing id, computed from the review rows.
async fn ratings_for<C: ConnectionTrait>(db: &C, ids: &[Uuid]) -> Result<HashMap<Uuid, f64>, ServiceError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, i32)> = review::Entity::find()
        .select_only()
        .column(review::Column::ServiceId)
        .column(review::Column::Rating)
        .filter(review::Column::ServiceId.is_in(ids.to_vec()))
        .into_tuple()
        .all(db)
        .await?;
    let mut grouped: HashMap<Uuid, Vec<i32>> = HashMap::new();
    for (id, score) in rows {
        grouped.entry(id).or_default().push(score);
    }
    Ok(grouped
        .into_iter()
        .filter_map(|(id, scores)| rating::aggregate(&scores).map(|avg| (id, avg)))
        .collect())
}

fn with_ratings(rows: Vec<service::Model>, ratings: &HashMap<Uuid, f64>) -> Vec<ServiceListing> {
    rows.into_iter()
        .map(|m| {
            let avg = ratings.get(&m.id).copied();
            ServiceListing::from_model(m, avg)
        })
        .collect()
}

impl SeaOrmListingRepository {
    async fn load(&self, id: Uuid) -> Result<Option<ServiceListing>, ServiceError> {
        let Some(model) = service::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let ratings = ratings_for(&self.db, &[id]).await?;
        Ok(with_ratings(vec![model], &ratings).pop())
    }
}

#[async_trait::async_trait]
impl ListingRepository for SeaOrmListingRepository {
    async fn find_page(&self, query: &QueryDescription) -> Result<ListingPage, ServiceError> {
        // rows and count come from one snapshot
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::RepeatableRead), Some(AccessMode::ReadOnly))
            .await?;
        let filtered = apply(query);
        let exact = match query.count {
            CountMode::Exact => Some(filtered.clone().count(&txn).await?),
            CountMode::None => None,
        };
        let mut rows = order(filtered, query);
        if let Some(range) = &query.range {
            rows = rows.offset(range.start).limit(range.end - range.start);
        }
        let rows = rows.all(&txn).await?;
        let ids: Vec<Uuid> = rows.iter().map(|m| m.id).collect();
        let ratings = ratings_for(&txn, &ids).await?;
        txn.commit().await?;

        let total = exact.unwrap_or(rows.len() as u64);
        debug!(rows = rows.len(), total, "listing page loaded");
        Ok(ListingPage { items: with_ratings(rows, &ratings), total })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceListing>, ServiceError> {
        self.load(id).await
    }

    async fn insert(&self, owner: Uuid, form: &ListingForm) -> Result<ServiceListing, ServiceError> {
        let created = service::create(&self.db, owner, form.fields()).await?;
        Ok(ServiceListing::from_model(created, None))
    }

    async fn update_owned(&self, id: Uuid, owner: Uuid, form: &ListingForm) -> Result<ServiceListing, ServiceError> {
        let updated = service::update_owned(&self.db, id, owner, form.fields()).await?;
        let ratings = ratings_for(&self.db, &[id]).await?;
        Ok(ServiceListing::from_model(updated, ratings.get(&id).copied()))
    }

    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> Result<(), ServiceError> {
        service::delete_owned(&self.db, id, owner).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReviewRepository for SeaOrmListingRepository {
    async fn list_reviews(&self, service_id: Uuid) -> Result<Vec<Review>, ServiceError> {
        let rows = review::for_service(&self.db, service_id).await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn insert_review(&self, service_id: Uuid, user_id: Uuid, form: &ReviewForm) -> Result<Review, ServiceError> {
        let created = review::create(&self.db, service_id, user_id, form.rating, form.comment()).await?;
        Ok(created.into())
    }
}

#[async_trait::async_trait]
impl RequestRepository for SeaOrmListingRepository {
    async fn insert_request(&self, service_id: Uuid, form: &RequestForm) -> Result<ServiceRequest, ServiceError> {
        let created =
            models::service_request::create(&self.db, service_id, &form.name, &form.email, form.phone(), &form.message)
                .await?;
        Ok(created.into())
    }
}
