use axum::extract::DefaultBodyLimit;
use axum::http::Uri;
use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::upload::MAX_IMAGE_BYTES;

use crate::errors::JsonApiError;
use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod auth;
pub mod pages;
pub mod profile;
pub mod reviews;
pub mod services;
pub mod uploads;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn fallback(uri: Uri) -> JsonApiError {
    JsonApiError::not_found(format!("no route for {}", uri.path()))
}

/// Build the full application router: JSON API, auth, uploaded images and docs.
pub fn build_router(state: ServerState, cors: CorsLayer, upload_dir: &str, upload_base: &str) -> Router {
    let api = Router::new()
        .route("/api/home", get(services::home))
        .route("/api/catalog", get(pages::catalog))
        .route("/api/pages/:slug", get(pages::page))
        .route("/api/services", get(services::list).post(services::create))
        .route(
            "/api/services/:id",
            get(services::detail).put(services::update).delete(services::delete),
        )
        .route("/api/services/:id/reviews", get(reviews::list).post(reviews::submit))
        .route("/api/services/:id/requests", post(reviews::request))
        .route("/api/category/:category", get(services::by_category))
        .route("/api/dashboard", get(services::dashboard))
        .route("/api/profile", get(profile::get).put(profile::update))
        .route(
            "/api/uploads",
            post(uploads::upload).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024)),
        );

    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/me", get(auth::me));

    let mut app = Router::new()
        .route("/health", get(health))
        .merge(api)
        .merge(auth_routes)
        .fallback(fallback)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // local uploads are served from disk under their public path
    if upload_base.starts_with('/') {
        app = app.nest_service(upload_base, ServeDir::new(upload_dir));
    }

    app.layer(cors).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
            .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
    )
}
