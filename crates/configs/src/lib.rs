use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub listings: ListingsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Address of the admin listener serving `/healthz` and `/metrics`.
    #[serde(default)]
    pub admin_addr: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4), admin_addr: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_session_hours")]
    pub session_hours: i64,
    #[serde(default = "default_reset_minutes")]
    pub reset_link_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: String::new(), session_hours: default_session_hours(), reset_link_minutes: default_reset_minutes() }
    }
}

fn default_session_hours() -> i64 { 12 }
fn default_reset_minutes() -> i64 { 60 }

/// Where uploaded images go. `backend = "local"` writes under `local_dir`;
/// `backend = "http"` posts to an object-storage endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    #[serde(default = "default_local_dir")]
    pub local_dir: String,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            local_dir: default_local_dir(),
            public_base_url: default_public_base_url(),
            endpoint: String::new(),
            bucket: default_bucket(),
            api_key: String::new(),
        }
    }
}

fn default_storage_backend() -> String { "local".into() }
fn default_local_dir() -> String { "data/service-images".into() }
fn default_public_base_url() -> String { "/service-images".into() }
fn default_bucket() -> String { "service-images".into() }

#[derive(Debug, Clone, Deserialize)]
pub struct ListingsConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_home_size")]
    pub home_page_size: u32,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl Default for ListingsConfig {
    fn default() -> Self {
        Self { page_size: default_page_size(), home_page_size: default_home_size(), fetch_timeout_secs: default_fetch_timeout() }
    }
}

fn default_page_size() -> u32 { 9 }
fn default_home_size() -> u32 { 6 }
fn default_fetch_timeout() -> u64 { 15 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Like [`AppConfig::load_and_validate`], but a missing config file yields
    /// defaults filled from the environment.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.normalize_from_env();
        self.storage.validate()?;
        self.listings.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            if !host.trim().is_empty() { self.host = host; }
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        // fall back to DATABASE_URL when the file leaves it blank
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            self.jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string());
        }
        if self.session_hours <= 0 { self.session_hours = default_session_hours(); }
        if self.reset_link_minutes <= 0 { self.reset_link_minutes = default_reset_minutes(); }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        match self.backend.as_str() {
            "local" => {
                if self.local_dir.trim().is_empty() {
                    return Err(anyhow!("storage.local_dir is required for the local backend"));
                }
                Ok(())
            }
            "http" => {
                if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
                    return Err(anyhow!("storage.endpoint must start with http(s) for the http backend"));
                }
                if self.bucket.trim().is_empty() {
                    return Err(anyhow!("storage.bucket is required for the http backend"));
                }
                Ok(())
            }
            other => Err(anyhow!("unknown storage.backend '{other}' (expected local or http)")),
        }
    }
}

impl ListingsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.home_page_size == 0 {
            return Err(anyhow!("listings page sizes must be >= 1"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(anyhow!("listings.fetch_timeout_secs must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_section_defaults() {
        let cfg = load_from_str("").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.listings.page_size, 9);
        assert_eq!(cfg.listings.fetch_timeout_secs, 15);
        assert_eq!(cfg.storage.backend, "local");
        assert_eq!(cfg.database.max_connections, 10);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = load_from_str(
            r#"
            [database]
            url = "postgres://u:p@localhost/chowk"
            max_connections = 4

            [listings]
            page_size = 12
            "#,
        )
        .unwrap();
        assert_eq!(cfg.database.max_connections, 4);
        assert_eq!(cfg.database.min_connections, 2);
        assert_eq!(cfg.listings.page_size, 12);
        assert_eq!(cfg.listings.home_page_size, 6);
        assert!(cfg.database.validate().is_ok());
    }

    #[test]
    fn database_url_scheme_is_checked() {
        let db = DatabaseConfig { url: "mysql://localhost/x".into(), ..DatabaseConfig::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn storage_backend_is_checked() {
        let mut storage = StorageConfig::default();
        assert!(storage.validate().is_ok());
        storage.backend = "http".into();
        assert!(storage.validate().is_err());
        storage.endpoint = "https://storage.example.com".into();
        assert!(storage.validate().is_ok());
        storage.backend = "ftp".into();
        assert!(storage.validate().is_err());
    }

    #[test]
    fn zero_fetch_timeout_is_rejected() {
        let listings = ListingsConfig { fetch_timeout_secs: 0, ..ListingsConfig::default() };
        assert!(listings.validate().is_err());
    }
}
