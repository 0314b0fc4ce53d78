use actix_cors::Cors;
use actix_web::{
    middleware::{Condition, Logger},
    App, HttpServer,
};
use std::io;

use taskgate::{repository::Repositories, AppState, Config};

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let repositories = Repositories::connect(&config).await.map_err(startup_error)?;

    let bind = (config.server_host.clone(), config.server_port);
    log::info!("Starting server at {}", config.server_url());
    if !config.require_auth {
        log::warn!("REQUIRE_AUTH is off; task routes are public");
    }

    let state = AppState::new(config, repositories);

    HttpServer::new(move || {
        let logger = match &state.config.log_format {
            Some(format) => Logger::new(format),
            None => Logger::default(),
        };

        App::new()
            .wrap(Condition::new(
                state.config.enable_cors,
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            ))
            .wrap(logger)
            .configure(|cfg| state.configure(cfg))
    })
    .bind(bind)?
    .run()
    .await
}
