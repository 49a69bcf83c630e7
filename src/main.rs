//Third-party-dependencies
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};

use hackhub_service::config::AppConfig;
use hackhub_service::routes;
use hackhub_service::state::AppState;
use hackhub_service::utils::auth_middleware::Authentication;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(|e| {
        error!("❌ Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    let address = config.bind_address.clone();
    let state = web::Data::new(AppState::from_config(config)?);

    info!("🚀 Server started at {}", address);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Authentication)
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind(address)?
    .run()
    .await
}
