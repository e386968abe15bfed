pub mod auth;
pub mod books;
pub mod health;
pub mod news;
pub mod publications;
pub mod tokens;

use actix_web::web;

use crate::error::{json_error_handler, path_error_handler, query_error_handler};

/// Registers every route of the application
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(
            web::scope("/health")
                .route("", web::get().to(health::liveness))
                .route("/ready", web::get().to(health::readiness)),
        )
        .configure(auth::configure)
        .configure(tokens::configure)
        .configure(news::configure)
        .configure(publications::configure)
        .configure(books::configure);
}
