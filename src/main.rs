mod config;
mod error;
mod inference;
mod render;
mod routes;
mod storage;

use actix_web::{web, App, HttpServer};
use config::AppConfig;
use inference::AgeModel;
use routes::configure_routes;
use std::env;
use std::path::Path;
use storage::TempStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let config = AppConfig::from_env();

    let static_dir = if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        format!("{}/static", manifest_dir)
    } else {
        "static".to_string()
    };

    let model = AgeModel::load(Path::new(&config.model_path)).map_err(|e| {
        log::error!("Failed to load model from {}: {}", config.model_path, e);
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Model loading failed: {}", e),
        )
    })?;
    log::info!("Loaded age classifier from {}", config.model_path);

    let store = TempStore::new().map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Upload store init failed: {}", e),
        )
    })?;
    log::info!("Storing uploads under {}", store.path().display());

    let bind_address = format!("0.0.0.0:{}", config.port);
    log::info!("Starting server on {}", bind_address);

    let app_config = config.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(model.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(app_config.clone()))
            .configure(|cfg| configure_routes(cfg, static_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
