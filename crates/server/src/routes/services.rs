//! Listing browse, detail and owner mutations.

use axum::extract::{Path, Query, RawQuery, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use common::types::Choice;
use models::catalog;
use service::filters::{self, SearchFilters};
use service::listing::view::ListingDetail;
use service::listing::{ListingForm, ListingPage, ServiceListing};
use service::pagination::{page_count, PageView, Pagination, Paginator};

use crate::errors::JsonApiError;
use crate::extract::{CurrentUser, MaybeUser};
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct PageParams {
    /// 1-based page number
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListingsResponse {
    pub items: Vec<ServiceListing>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub filters: SearchFilters,
    pub filtered: bool,
    pub view: PageView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub items: Vec<ServiceListing>,
    pub categories: Vec<Choice>,
}

pub(crate) fn choices(entries: &[catalog::CatalogEntry]) -> Vec<Choice> {
    entries.iter().map(|e| Choice { value: e.value.to_string(), label: e.label.to_string() }).collect()
}

async fn search(
    state: &ServerState,
    filters: SearchFilters,
    params: PageParams,
) -> Result<ListingsResponse, JsonApiError> {
    let Pagination { page, per_page: page_size } =
        Pagination::from_params(params.page, params.page_size, state.listing_cfg.page_size);
    let result = state.listings.search(&filters, page, page_size).await?;

    let mut paginator = Paginator::new(page_size);
    paginator.set_total(result.total);
    paginator.go_to(page);
    Ok(ListingsResponse {
        page_count: page_count(result.total, page_size),
        view: paginator.view(),
        items: result.items,
        total: result.total,
        page,
        page_size,
        filtered: filters.is_filtered(),
        filters,
    })
}

#[utoipa::path(get, path = "/api/home", tag = "services", responses((status = 200, description = "Newest services and categories")))]
pub async fn home(State(state): State<ServerState>) -> Result<Json<HomeResponse>, JsonApiError> {
    let newest = state.listings.search(&SearchFilters::default(), 1, state.listing_cfg.home_page_size).await?;
    Ok(Json(HomeResponse { items: newest.items, categories: choices(catalog::CATEGORIES) }))
}

#[utoipa::path(
    get, path = "/api/services", tag = "services",
    params(PageParams, ("query" = Option<String>, Query, description = "Text matched against title and description"),
        ("category" = Option<String>, Query,), ("city" = Option<String>, Query,)),
    responses((status = 200, description = "One page of matching services"), (status = 504, description = "Backend timed out"))
)]
pub async fn list(
    State(state): State<ServerState>,
    RawQuery(raw): RawQuery,
    Query(params): Query<PageParams>,
) -> Result<Json<ListingsResponse>, JsonApiError> {
    let filters = filters::decode(raw.as_deref().unwrap_or_default());
    Ok(Json(search(&state, filters, params).await?))
}

#[utoipa::path(
    get, path = "/api/category/{category}", tag = "services",
    params(("category" = String, Path,), PageParams),
    responses((status = 200, description = "One page of services in the category"))
)]
pub async fn by_category(
    State(state): State<ServerState>,
    Path(category): Path<String>,
    RawQuery(raw): RawQuery,
    Query(params): Query<PageParams>,
) -> Result<Json<ListingsResponse>, JsonApiError> {
    let filters = filters::decode(raw.as_deref().unwrap_or_default()).with_category(&category);
    Ok(Json(search(&state, filters, params).await?))
}

#[utoipa::path(
    get, path = "/api/services/{id}", tag = "services",
    params(("id" = Uuid, Path,)),
    responses((status = 200, description = "Service detail"), (status = 404, description = "Not Found"))
)]
pub async fn detail(
    State(state): State<ServerState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingDetail>, JsonApiError> {
    let listing = state.listings.get(id).await?;
    Ok(Json(ListingDetail::new(listing, viewer)))
}

#[utoipa::path(
    post, path = "/api/services", tag = "services",
    request_body = crate::openapi::ListingFormDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 401, description = "Unauthorized"))
)]
pub async fn create(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<ListingForm>,
) -> Result<(StatusCode, Json<ServiceListing>), JsonApiError> {
    let created = state.listings.create(Some(user), &form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put, path = "/api/services/{id}", tag = "services",
    params(("id" = Uuid, Path,)),
    request_body = crate::openapi::ListingFormDoc,
    responses((status = 200, description = "Updated"), (status = 403, description = "Not the owner"), (status = 404, description = "Not Found"))
)]
pub async fn update(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(form): Json<ListingForm>,
) -> Result<Json<ServiceListing>, JsonApiError> {
    let listing = state.listings.get(id).await?;
    Ok(Json(state.listings.update(Some(user), &listing, &form).await?))
}

#[utoipa::path(
    delete, path = "/api/services/{id}", tag = "services",
    params(("id" = Uuid, Path,)),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Not the owner"), (status = 404, description = "Not Found"))
)]
pub async fn delete(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    let listing = state.listings.get(id).await?;
    state.listings.delete(Some(user), &listing).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/dashboard", tag = "services", responses((status = 200, description = "The caller's services"), (status = 401, description = "Unauthorized")))]
pub async fn dashboard(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ListingPage>, JsonApiError> {
    let items = state.listings.owner_listings(user).await?;
    info!(user_id = %user, count = items.len(), "dashboard listed");
    Ok(Json(ListingPage { total: items.len() as u64, items }))
}
