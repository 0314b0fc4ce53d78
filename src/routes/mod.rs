pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{middleware::Condition, web};

use crate::auth::AuthMiddleware;

/// Mounts every route. When `require_auth` is set the `/tasks` scope sits
/// behind `AuthMiddleware`; `/auth`, `/users` and `/health` never do.
pub fn config(cfg: &mut web::ServiceConfig, require_auth: bool) {
    cfg.service(health::health)
        .service(auth::issue_token)
        .service(
            web::scope("/users")
                .service(users::signup)
                .service(users::login),
        )
        .service(
            web::scope("/tasks")
                .wrap(Condition::new(require_auth, AuthMiddleware))
                // registered ahead of `/{id}` so "filter" is not taken for an id
                .service(tasks::filter_tasks)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}
