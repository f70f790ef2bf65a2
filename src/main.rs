use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use std::io;

use todoforge::config::Config;
use todoforge::routes;
use todoforge::state::AppState;
use todoforge::store::postgres::{create_pool, run_migrations};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;
    log::debug!("Loaded {:?}", config);

    let pool = create_pool(&config).await.map_err(|e| {
        log::error!("Failed to connect to database: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;
    run_migrations(&pool).await.map_err(|e| {
        log::error!("Failed to run migrations: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;

    let state = AppState::postgres(pool, &config);

    log::info!("Starting todoforge server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::configure(state.clone()))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
