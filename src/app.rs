use actix_web::web;

use crate::auth::TokenCodec;
use crate::config::Config;
use crate::error::{path_error_handler, query_error_handler};
use crate::repository::{Repositories, TaskRepository, UserRepository};
use crate::routes;

/// Everything a worker needs, built once in `main` (or a test) and cloned into
/// each `App` instance.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repositories: Repositories,
    pub tokens: TokenCodec,
}

impl AppState {
    pub fn new(config: Config, repositories: Repositories) -> Self {
        let tokens = TokenCodec::new(&config.jwt_secret, config.token_ttl());
        Self {
            config,
            repositories,
            tokens,
        }
    }

    /// Registers shared data, extractor error handlers and every route.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::new(self.tokens.clone()))
            .app_data(web::Data::<dyn TaskRepository>::from(self.repositories.tasks.clone()))
            .app_data(web::Data::<dyn UserRepository>::from(self.repositories.users.clone()))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .configure(|cfg| routes::config(cfg, self.config.require_auth));
    }
}
