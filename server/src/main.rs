//! snagtrack entry point: configuration, adapter wiring, HTTP server.

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::HttpServer;
use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use snagtrack::outbound::persistence::run_migrations;
use snagtrack::server::{AppSettings, build_app, build_http_state};

fn load_session_key(settings: &AppSettings) -> std::io::Result<Key> {
    let key_path = settings.session_key_file();
    match std::fs::read(key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(error) => {
            if cfg!(debug_assertions) || settings.debug {
                warn!(path = %key_path, %error, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {error}"
                )))
            }
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|error| std::io::Error::other(format!("configuration failed: {error}")))?;

    if let Some(database_url) = settings.database_url.as_deref() {
        run_migrations(database_url)
            .map_err(|error| std::io::Error::other(format!("migrations failed: {error}")))?;
    }

    let key = load_session_key(&settings)?;
    let cookie_secure = !settings.debug;
    let state = build_http_state(&settings)
        .await
        .map_err(|error| std::io::Error::other(format!("adapter wiring failed: {error}")))?;
    let bind_addr = settings.bind_addr().to_owned();

    HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".into())
            .cookie_path("/".into())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(SameSite::Lax)
            .build();
        build_app(state.clone(), session)
    })
    .bind(bind_addr)?
    .run()
    .await
}
