use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpServer};

use profsite::bootstrap;
use profsite::config::Config;
use profsite::db::{self, DbPool};
use profsite::routes;
use profsite::services::AuthTokenService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let pool = db::create_pool(&config.database)
        .await
        .map_err(|e| startup_error("Database connection", e))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| startup_error("Migration", e))?;

    prepare(&pool).await;

    let bind = (config.host.clone(), config.port);
    log::info!("Profsite listening on {}:{}", bind.0, bind.1);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(build_cors(&config.security.allowed_origins))
            .configure(routes::configure)
    })
    .bind(bind)?
    .shutdown_timeout(30)
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutting down");
        handle.stop(true).await;
    });

    server.await
}

fn startup_error(stage: &str, err: impl std::fmt::Display) -> std::io::Error {
    log::error!("{} failed: {}", stage, err);
    std::io::Error::other(format!("{} failed: {}", stage, err))
}

/// First-run accounts and token housekeeping. Failures are logged and the
/// server starts anyway.
async fn prepare(pool: &DbPool) {
    if let Err(e) = bootstrap::create_superuser_if_needed(pool).await {
        log::error!("Failed to create superuser: {}", e);
    }

    match bootstrap::create_token_if_needed(pool).await {
        // stderr rather than the log so the secret stays out of log shipping
        Ok(Some(token)) => eprintln!(
            "\nBootstrap admin token (shown once, store it now):\n  {}\n",
            token
        ),
        Ok(None) => {}
        Err(e) => log::error!("Failed to bootstrap token: {}", e),
    }

    match AuthTokenService::purge_expired(pool).await {
        Ok(0) => {}
        Ok(n) => log::info!("Purged {} expired token(s)", n),
        Err(e) => log::warn!("Failed to purge expired tokens: {}", e),
    }
}

/// Any origin unless an allow-list is configured
fn build_cors(allowed_origins: &[String]) -> Cors {
    let cors = if allowed_origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers([header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600)
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
                return;
            }
            Err(e) => log::warn!("SIGTERM handler unavailable: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Ctrl+C handler unavailable: {}", e);
        std::future::pending::<()>().await;
    }
}
