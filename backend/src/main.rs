//! Backend entry-point: loads settings, prepares the database and serves the
//! REST API.

mod server;

use std::ffi::OsString;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use campus_backend::inbound::http::health::HealthState;
use campus_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{AppSettings, ServerConfig, build_http_state, create_server};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os().map(OsString::from))
        .map_err(|err| startup_error("failed to load settings", err))?;
    let database_url = settings
        .database_url()
        .map_err(|err| startup_error("invalid settings", err))?;
    let jwt_secret = settings
        .jwt_secret()
        .map_err(|err| startup_error("invalid settings", err))?;

    if settings.run_migrations {
        run_pending_migrations(database_url)
            .await
            .map_err(|err| startup_error("migrations failed", err))?;
    } else {
        info!("skipping database migrations");
    }

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await
        .map_err(|err| startup_error("failed to create database pool", err))?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(
        settings.bind_addr(),
        build_http_state(&pool, jwt_secret.as_bytes()),
    );
    create_server(health_state, config)?.await
}
