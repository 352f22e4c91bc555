mod config;
mod db;
mod error;
mod handlers;
mod models;
mod ranks;
mod services;
mod state;
mod validation;
mod view;

use config::Config;
use db::Db;
use ntex::web;
use ntex_cors::Cors;
use state::AppState;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[ntex::main]
async fn main() -> std::io::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load().map_err(|e| {
        error!("configuration rejected: {e}");
        std::io::Error::other(e)
    })?;

    let db = Db::open(&config.database_path, config.store_timeout).map_err(|e| {
        error!(path = %config.database_path, "failed to open database: {e}");
        std::io::Error::other(e)
    })?;
    info!(path = %config.database_path, "database ready");

    let state = AppState::new(db, &config);
    let address = format!("{}:{}", config.host, config.port);
    info!("NeonTiers server starting on {address}");

    let server_state = state.clone();
    web::HttpServer::new(move || {
        web::App::new()
            .state(server_state.clone())
            .wrap(
                Cors::new()
                    .allowed_origin("*")
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type", "Authorization"])
                    .max_age(3600)
                    .finish(),
            )
            .configure(routes)
    })
    .bind(&address)?
    .run()
    .await?;

    info!("server stopped, closing database");
    if let Err(e) = state.db.close() {
        error!("failed to close database cleanly: {e}");
    }
    Ok(())
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::page::leaderboard_page))
        .route("/api/health", web::get().to(health))
        .service(
            web::resource("/tests")
                .route(web::get().to(handlers::tests::list_tests))
                .route(web::post().to(handlers::tests::submit_test)),
        )
        .route("/tests/{username}/{mode}", web::get().to(handlers::tests::get_test));
}

async fn health() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
