use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct RegisterRequest { pub email: String, pub password: String, pub full_name: String, pub confirm_password: Option<String> }

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct ListingFormDoc {
    pub title: String,
    pub description: String,
    /// One of the catalog category values
    pub category: String,
    /// One of the catalog city values
    pub city: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub image_url: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct ReviewFormDoc { pub rating: i32, pub comment: Option<String> }

#[derive(utoipa::ToSchema)]
pub struct RequestFormDoc { pub name: String, pub email: String, pub phone: Option<String>, pub message: String }

#[derive(utoipa::ToSchema)]
pub struct ProfileUpdateDoc { pub full_name: String, pub avatar_url: Option<String> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::forgot_password,
        crate::routes::auth::reset_password,
        crate::routes::auth::me,
        crate::routes::services::home,
        crate::routes::services::list,
        crate::routes::services::by_category,
        crate::routes::services::detail,
        crate::routes::services::create,
        crate::routes::services::update,
        crate::routes::services::delete,
        crate::routes::services::dashboard,
        crate::routes::reviews::list,
        crate::routes::reviews::submit,
        crate::routes::reviews::request,
        crate::routes::profile::get,
        crate::routes::profile::update,
        crate::routes::uploads::upload,
        crate::routes::pages::catalog,
        crate::routes::pages::page,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            ListingFormDoc,
            ReviewFormDoc,
            RequestFormDoc,
            ProfileUpdateDoc,
            crate::routes::auth::ForgotPasswordInput,
            crate::routes::auth::ResetPasswordInput,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "services"),
        (name = "reviews"),
        (name = "profile"),
        (name = "uploads"),
        (name = "pages")
    )
)]
pub struct ApiDoc;
