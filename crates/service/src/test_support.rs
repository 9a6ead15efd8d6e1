#![cfg(test)]
use chrono::Utc;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::listing::domain::{ListingForm, ServiceListing};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn db_config() -> configs::DatabaseConfig {
    let mut cfg = configs::load_default().map(|c| c.database).unwrap_or_default();
    cfg.normalize_from_env();
    if cfg.url.trim().is_empty() {
        cfg.url = models::db::DATABASE_URL.clone();
    }
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.acquire_timeout_secs = 10;
    cfg
}

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    // Run migrations exactly once, with a throwaway connection
    let migrated = *MIGRATED
        .get_or_init(|| async {
            let Ok(db) = models::db::connect_with_config(&db_config()).await else { return false };
            migration::Migrator::up(&db, None).await.is_ok()
        })
        .await;
    if !migrated {
        anyhow::bail!("database unavailable or migrations failed");
    }

    // Return a fresh connection for the current test's runtime
    models::db::connect_with_config(&db_config()).await
}

pub fn listing_form(title: &str, category: &str, city: &str) -> ListingForm {
    ListingForm {
        title: title.to_string(),
        description: format!("{title}: experienced, fast and friendly service"),
        category: category.to_string(),
        city: city.to_string(),
        contact_email: "owner@example.com".into(),
        contact_phone: None,
        image_url: None,
    }
}

pub fn listing(title: &str, category: &str, city: &str) -> ServiceListing {
    let form = listing_form(title, category, city);
    let now = Utc::now();
    ServiceListing {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        title: form.title,
        description: form.description,
        category: form.category,
        city: form.city,
        contact_email: form.contact_email,
        contact_phone: None,
        image_url: None,
        created_at: now,
        updated_at: now,
        average_rating: None,
    }
}
