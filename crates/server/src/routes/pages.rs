//! Catalog lists and the static informational pages.

use axum::extract::Path;
use axum::Json;
use serde::Serialize;

use common::types::Choice;
use models::catalog;

use super::services::choices;
use crate::errors::JsonApiError;

#[derive(Debug, Serialize)]
pub struct CatalogOutput {
    pub categories: Vec<Choice>,
    pub cities: Vec<Choice>,
}

#[derive(Debug, Serialize)]
pub struct PageOutput {
    pub slug: &'static str,
    pub title: &'static str,
    pub sections: &'static [&'static str],
}

const PAGES: &[PageOutput] = &[
    PageOutput {
        slug: "about",
        title: "About Chowk",
        sections: &[
            "We promote high standards in work and service.",
            "We foster meaningful connections between freelancers and clients.",
            "We advocate for honest communication and business practices.",
            "We ensure professional services are available to everyone.",
            "We support the professional development of our freelancers and the success of our clients.",
        ],
    },
    PageOutput {
        slug: "contact",
        title: "Contact us",
        sections: &["Have questions about Chowk? Want to partner with us? Just want to say hello? We'd love to hear from you!"],
    },
    PageOutput {
        slug: "privacy",
        title: "Privacy policy",
        sections: &[
            "We collect identity, contact, technical, profile and usage data.",
            "We use your data when legally permitted: to fulfil contracts with you, for legitimate interests, and to comply with legal obligations.",
            "You may request access, correction, deletion or transfer of your personal data, object to processing, or withdraw consent at any time.",
            "For rights-related inquiries, contact privacy@chowk.com.",
        ],
    },
    PageOutput {
        slug: "terms",
        title: "Terms of service",
        sections: &[
            "Listings must describe real services offered by the account that posts them.",
            "Reviews must reflect a genuine experience with the service.",
            "Chowk connects freelancers and clients and is not a party to their agreements.",
        ],
    },
];

#[utoipa::path(get, path = "/api/catalog", tag = "pages", responses((status = 200, description = "Categories and cities")))]
pub async fn catalog() -> Json<CatalogOutput> {
    Json(CatalogOutput { categories: choices(catalog::CATEGORIES), cities: choices(catalog::CITIES) })
}

#[utoipa::path(get, path = "/api/pages/{slug}", tag = "pages", params(("slug" = String, Path,)), responses((status = 200, description = "Page content"), (status = 404, description = "Unknown page")))]
pub async fn page(Path(slug): Path<String>) -> Result<Json<&'static PageOutput>, JsonApiError> {
    PAGES
        .iter()
        .find(|p| p.slug == slug)
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found(format!("page '{slug}'")))
}
