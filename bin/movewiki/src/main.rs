//! # movewiki Binary
//!
//! The entry point that assembles the application based on compile-time features.

use actix_web::{web, App, HttpServer};
use mw_api::handlers::AppState;
use mw_api::middleware::{cors_policy, security_headers, standard_middleware};
use mw_config::Settings;
use mw_core::traits::WikiRepo;
use secrecy::ExposeSecret;

// Feature-gated imports: the storage plugin is chosen at compile time
#[cfg(feature = "db-sqlite")]
use mw_db_sqlite::SqliteWikiRepo;

#[cfg(not(feature = "db-sqlite"))]
compile_error!("movewiki needs a storage plugin; enable the `db-sqlite` feature");

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // 1. Load settings (.env, then MOVEWIKI_* variables)
    let settings = Settings::load()?;

    // 2. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo: Box<dyn WikiRepo> =
        Box::new(SqliteWikiRepo::new(settings.database_url.expose_secret()).await?);

    // 3. Wrap in AppState (Using dynamic dispatch for maximum flexibility)
    let state = web::Data::new(AppState {
        repo,
        page_size: settings.page_size,
        feed_size: settings.feed_size,
        public_url: settings.public_url.clone(),
    });

    let (host, port) = settings.bind_addr();
    let static_dir = settings.static_dir.clone();
    log::info!("movewiki starting on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(standard_middleware())
            .wrap(cors_policy())
            .wrap(security_headers())
            .service(actix_files::Files::new("/static", &static_dir))
            .configure(mw_api::configure_routes)
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
