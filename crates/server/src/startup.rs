use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use common::admin_http::spawn_admin_server;
use common::metrics::encode_metrics;
use common::utils::logging::{init_logging_default, init_logging_json};
use configs::AppConfig;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

/// Initialize logging via shared common utils; `LOG_FORMAT=json` switches
/// to structured output.
pub fn init_logging() {
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => init_logging_json(),
        _ => init_logging_default(),
    }
}

/// `config.toml` (or `CONFIG_PATH`) with env fallbacks.
pub fn load_config() -> Result<AppConfig, StartupError> {
    AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &configs::ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address {}:{}: {e}", cfg.host, cfg.port)))
}

/// Connect, migrate and serve until `shutdown` resolves. In-flight
/// requests are drained before returning.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = bind_addr(&cfg.server)?;
    common::env::ensure_upload_dir(&cfg.storage.backend, &cfg.storage.local_dir).await?;

    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Database(format!("migrations failed: {e}")))?;
    info!("migrations applied");

    if let Some(admin_addr) = cfg.server.admin_addr.as_deref() {
        spawn_admin_server(admin_addr, encode_metrics);
    }

    let state = ServerState::from_db(db, &cfg);
    let app: Router = routes::build_router(state, build_cors(), &cfg.storage.local_dir, &cfg.storage.public_base_url);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    info!(%addr, "marketplace api listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(anyhow::Error::from)?;
    info!("marketplace api stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_joins_host_and_port() {
        let cfg = configs::ServerConfig { host: "0.0.0.0".into(), port: 9090, worker_threads: None, admin_addr: None };
        assert_eq!(bind_addr(&cfg).unwrap().to_string(), "0.0.0.0:9090");
    }

    #[test]
    fn hostname_is_rejected_as_bind_addr() {
        let cfg = configs::ServerConfig { host: "localhost".into(), port: 9090, worker_threads: None, admin_addr: None };
        assert!(matches!(bind_addr(&cfg), Err(StartupError::InvalidConfig(_))));
    }
}
