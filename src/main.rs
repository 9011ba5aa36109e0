use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

use catalog_admin::config::Settings;
use catalog_admin::seed::seed_catalog;
use catalog_admin::{handlers, AppState};

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load().map_err(io_error)?;
    let state = AppState::connect(&settings.database).map_err(io_error)?;

    if settings.seed.enabled {
        let (categories, products) = (state.categories.clone(), state.products.clone());
        web::block(move || seed_catalog(categories.as_ref(), products.as_ref()))
            .await
            .map_err(io_error)?
            .map_err(io_error)?;
    }

    let app_state = web::Data::new(state);
    let (host, port) = (settings.server.host.clone(), settings.server.port);
    log::info!("Starting HTTP server on http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(handlers::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
