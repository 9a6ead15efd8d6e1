use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use server::routes;
use server::state::{Backends, ServerState};
use service::auth::repository::mock::MockAuthRepository;
use service::listing::repository::mock::MockListingRepository;
use service::listing::ServiceListing;
use service::upload::LocalBlobStore;

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

struct TestApp {
    app: Router,
    listings: Arc<MockListingRepository>,
}

fn build_app() -> TestApp {
    let listings = Arc::new(MockListingRepository::new());
    let upload_dir = std::env::temp_dir().join(format!("chowk-uploads-{}", Uuid::new_v4()));
    let backends = Backends {
        listings: listings.clone(),
        reviews: listings.clone(),
        requests: listings.clone(),
        auth: Arc::new(MockAuthRepository::default()),
        blobs: Arc::new(LocalBlobStore::new(&upload_dir, "/service-images")),
    };
    let mut cfg = configs::AppConfig::default();
    cfg.auth.jwt_secret = "test-secret".into();
    let state = ServerState::new(backends, &cfg);
    let app = routes::build_router(state, cors(), upload_dir.to_str().unwrap(), "/service-images");
    TestApp { app, listings }
}

fn seeded(title: &str, category: &str, city: &str, owner: Uuid, age_secs: i64) -> ServiceListing {
    let at = chrono::Utc::now() - chrono::Duration::seconds(age_secs);
    ServiceListing {
        id: Uuid::new_v4(),
        user_id: owner,
        title: title.into(),
        description: format!("{title} offered by a local professional"),
        category: category.into(),
        city: city.into(),
        contact_email: "owner@example.com".into(),
        contact_phone: None,
        image_url: None,
        created_at: at,
        updated_at: at,
        average_rating: None,
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_req(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut b = Request::builder().method(method).uri(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        b = b.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    b.body(Body::from(serde_json::to_vec(&body).unwrap())).unwrap()
}

async fn register(app: &Router, email: &str) -> (Uuid, String) {
    let (status, body) = send(
        app,
        json_req("POST", "/auth/register", None, json!({"email": email, "password": "secret1", "full_name": "Test User"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
    (id, body["token"].as_str().unwrap().to_string())
}

fn listing_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Weekly garden care, pruning and seasonal planting.",
        "category": "other",
        "city": "london",
        "contact_email": "gardener@example.com"
    })
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let t = build_app();
    let (status, body) = send(&t.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&t.app, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn listing_search_applies_filters_and_paging() {
    let t = build_app();
    let owner = Uuid::new_v4();
    for i in 0..11 {
        t.listings.seed(seeded(&format!("Logo design {i}"), "design", "london", owner, i));
    }
    t.listings.seed(seeded("Plumbing repairs", "other", "london", owner, 100));

    let (status, body) = send(&t.app, get("/api/services?category=design&city=_all&page=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 11);
    assert_eq!(body["page_count"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["filtered"], true);
    assert_eq!(body["filters"]["category"], "design");
    assert!(body["filters"].get("city").is_none());

    let (_, body) = send(&t.app, get("/api/services?query=PLUMB")).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["title"], "Plumbing repairs");

    let (_, body) = send(&t.app, get("/api/category/other")).await;
    assert_eq!(body["total"], 1);

    let (_, body) = send(&t.app, get("/api/services?category=design&page=0&page_size=0")).await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 1);
    assert_eq!(body["page_count"], 11);

    let (_, body) = send(&t.app, get("/api/services?page_size=5000")).await;
    assert_eq!(body["page_size"], 100);
    assert_eq!(body["items"].as_array().unwrap().len(), 12);

    let (_, body) = send(&t.app, get("/api/services?query=nothing-matches")).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["view"]["kind"], "empty");
}

#[tokio::test]
async fn home_lists_newest_six_and_categories() {
    let t = build_app();
    let owner = Uuid::new_v4();
    for i in 0..8 {
        t.listings.seed(seeded(&format!("Tutoring {i}"), "education", "dubai", owner, i));
    }
    let (status, body) = send(&t.app, get("/api/home")).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 6);
    assert_eq!(items[0]["title"], "Tutoring 0");
    assert!(!body["categories"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn owner_mutations_are_checked() {
    let t = build_app();
    let (owner, owner_token) = register(&t.app, "owner@example.com").await;
    let (_, other_token) = register(&t.app, "other@example.com").await;

    let (status, _) = send(&t.app, json_req("POST", "/api/services", None, listing_body("Garden care"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, created) =
        send(&t.app, json_req("POST", "/api/services", Some(&owner_token), listing_body("Garden care"))).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["user_id"], owner.to_string());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) =
        send(&t.app, json_req("POST", "/api/services", Some(&owner_token), json!({"title": "x", "description": "", "category": "", "city": "", "contact_email": "nope"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"].as_array().unwrap().len() >= 4);

    let uri = format!("/api/services/{id}");
    let (status, _) = send(&t.app, json_req("PUT", &uri, Some(&other_token), listing_body("Hijacked title"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&t.app, json_req("DELETE", &uri, Some(&other_token), Value::Null)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(&t.app, json_req("PUT", &uri, Some(&owner_token), listing_body("Garden care plus"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Garden care plus");

    let req = Request::builder().uri("/api/dashboard").header(header::AUTHORIZATION, format!("Bearer {owner_token}")).body(Body::empty()).unwrap();
    let (status, dash) = send(&t.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dash["total"], 1);

    let (status, _) = send(&t.app, json_req("DELETE", &uri, Some(&owner_token), Value::Null)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&t.app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn detail_controls_and_reviews() {
    let t = build_app();
    let (owner, owner_token) = register(&t.app, "owner@example.com").await;
    let (_, visitor_token) = register(&t.app, "visitor@example.com").await;
    let listing = seeded("Wedding photography", "design", "london", owner, 0);
    let uri = format!("/api/services/{}", listing.id);
    t.listings.seed(listing);

    let (status, detail) = send(&t.app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["rating_label"], "No ratings yet");
    assert_eq!(detail["controls"]["show_request_form"], true);
    assert_eq!(detail["controls"]["show_review_form"], false);

    let reviews_uri = format!("{uri}/reviews");
    let (status, _) = send(&t.app, json_req("POST", &reviews_uri, None, json!({"rating": 5}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&t.app, json_req("POST", &reviews_uri, Some(&owner_token), json!({"rating": 5}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&t.app, json_req("POST", &reviews_uri, Some(&visitor_token), json!({"rating": 9}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) =
        send(&t.app, json_req("POST", &reviews_uri, Some(&visitor_token), json!({"rating": 4, "comment": "Lovely photos, on time."}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&t.app, json_req("POST", &reviews_uri, Some(&visitor_token), json!({"rating": 5}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, listed) = send(&t.app, get(&reviews_uri)).await;
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let req = Request::builder().uri(&uri).header(header::COOKIE, format!("auth_token={visitor_token}")).body(Body::empty()).unwrap();
    let (_, detail) = send(&t.app, req).await;
    assert_eq!(detail["listing"]["average_rating"], 4.5);
    assert_eq!(detail["controls"]["show_review_form"], true);
    assert_eq!(detail["controls"]["can_edit"], false);
}

#[tokio::test]
async fn service_requests_need_no_sign_in() {
    let t = build_app();
    let listing = seeded("Tax filing", "business", "london", Uuid::new_v4(), 0);
    let uri = format!("/api/services/{}/requests", listing.id);
    t.listings.seed(listing);

    let (status, body) = send(&t.app, json_req("POST", &uri, None, json!({"name": "J", "email": "bad", "message": "short"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"].as_array().unwrap().len(), 3);

    let (status, _) = send(
        &t.app,
        json_req("POST", &uri, None, json!({"name": "Jamal", "email": "jamal@example.com", "message": "Can you help with my 2024 return?"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(t.listings.requests().len(), 1);

    let (status, _) = send(&t.app, json_req("POST", &format!("/api/services/{}/requests", Uuid::new_v4()), None, json!({"name": "Jamal", "email": "jamal@example.com", "message": "Can you help with my 2024 return?"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn auth_cookie_profile_and_reset() {
    let t = build_app();
    let resp = t
        .app
        .clone()
        .oneshot(json_req("POST", "/auth/register", None, json!({"email": "ada@example.com", "password": "secret1", "full_name": "Ada"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap().to_string();
    assert!(cookie.starts_with("auth_token="));

    let (status, _) = send(&t.app, json_req("POST", "/auth/register", None, json!({"email": "ADA@example.com", "password": "secret1", "full_name": "Ada"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&t.app, json_req("POST", "/auth/login", None, json!({"email": "ada@example.com", "password": "wrong!"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, session) = send(&t.app, json_req("POST", "/auth/login", None, json!({"email": "ada@example.com", "password": "secret1"}))).await;
    assert_eq!(status, StatusCode::OK);
    let token = session["token"].as_str().unwrap();

    let (status, profile) = send(&t.app, json_req("PUT", "/api/profile", Some(token), json!({"full_name": "Ada Lovelace"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["full_name"], "Ada Lovelace");
    let req = Request::builder().uri("/auth/me").header(header::AUTHORIZATION, format!("Bearer {token}")).body(Body::empty()).unwrap();
    let (status, me) = send(&t.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ada@example.com");

    let (status, _) = send(&t.app, get("/api/profile")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&t.app, json_req("POST", "/auth/forgot-password", None, json!({"email": "nobody@example.com"}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (status, _) = send(&t.app, json_req("POST", "/auth/reset-password", None, json!({"token": token, "password": "another1"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn uploads_accept_images_only() {
    let t = build_app();
    let (_, token) = register(&t.app, "uploader@example.com").await;
    let upload = |content_type: &str, bytes: Vec<u8>| {
        Request::builder()
            .method("POST")
            .uri("/api/uploads")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, content_type)
            .header("x-file-name", "photo.PNG")
            .body(Body::from(bytes))
            .unwrap()
    };

    let (status, _) = send(&t.app, upload("text/plain", b"hello".to_vec())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&t.app, upload("image/png", vec![0x89, b'P', b'N', b'G'])).await;
    assert_eq!(status, StatusCode::CREATED);
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("/service-images/") && url.ends_with(".png"), "{url}");

    let (status, _) = send(&t.app, get(url)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn catalog_and_static_pages() {
    let t = build_app();
    let (status, body) = send(&t.app, get("/api/catalog")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["cities"].as_array().unwrap().is_empty());

    let (status, body) = send(&t.app, get("/api/pages/about")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "About Chowk");
    let (status, _) = send(&t.app, get("/api/pages/careers")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
