pub mod error;
pub mod multipart;
pub mod upload;

use actix_cors::Cors;
use actix_web::{web, HttpResponse, Responder};
use application::command::upload::UploadService;
use infra::config::AppConfigImpl;
use serde_json::json;

pub struct AppState {
    pub app_cfg: AppConfigImpl,
    pub uploads: UploadService,
}

impl AppState {
    pub fn new(app_cfg: AppConfigImpl, uploads: UploadService) -> Self {
        Self { app_cfg, uploads }
    }
}

pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PATCH", "PUT", "DELETE", "HEAD"])
        .allow_any_header()
        .max_age(3600)
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "IPFS Upload Service",
    }))
}

pub fn configure_service(svc: &mut web::ServiceConfig) {
    svc.route("/health", web::get().to(health))
        .configure(upload::configure_routes);
}
