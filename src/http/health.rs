use actix_web::{HttpResponse, Responder};
use tracing::debug;

pub(crate) async fn health_check() -> impl Responder {
    debug!("Health check");

    HttpResponse::Ok().body("OK")
}
