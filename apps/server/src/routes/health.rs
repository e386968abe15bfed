use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::db::{self, DbPool};

#[derive(Serialize)]
struct Liveness {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct Readiness {
    status: &'static str,
    database: &'static str,
}

/// GET /health - answers as long as the process runs
pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(Liveness {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health/ready - 503 while the database is unreachable
pub async fn readiness(pool: web::Data<DbPool>) -> HttpResponse {
    match db::ping(pool.get_ref()).await {
        Ok(()) => HttpResponse::Ok().json(Readiness {
            status: "ready",
            database: "ok",
        }),
        Err(e) => {
            log::warn!("Readiness check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(Readiness {
                status: "not_ready",
                database: "error",
            })
        }
    }
}
