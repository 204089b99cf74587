use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use application::command::upload::{UploadOptions, UploadService};
use infra::config::AppConfigImpl;
use infra::{StorachaClient, SymphoniaDurationReader, UuidTokenIdGenerator};
use log::{info, warn};
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {m}{n}",
        )))
        .build("app.log")
        .unwrap();

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .appender(Appender::builder().build(
            "stdout",
            Box::new(log4rs::append::console::ConsoleAppender::builder().build()),
        ))
        .build(
            Root::builder()
                .appender("file")
                .appender("stdout")
                .build(log_level.parse().unwrap_or(log::LevelFilter::Info)),
        )
        .unwrap();

    log4rs::init_config(config).unwrap();
    let cfg = AppConfigImpl::load().unwrap();
    let server_cfg = cfg.server();
    let storacha_cfg = cfg.storacha();
    let upload_cfg = cfg.upload();

    if storacha_cfg.email.is_empty() {
        warn!("STORACHA_EMAIL is not set; first-run authentication will fail until it is");
    } else {
        info!("Storacha account: {}", storacha_cfg.email);
    }

    let uploads = UploadService::new(
        Arc::new(StorachaClient::new(storacha_cfg)),
        Arc::new(SymphoniaDurationReader::new()),
        Arc::new(UuidTokenIdGenerator::new()),
        UploadOptions {
            gateway_base: cfg.gateway().upload_base,
            public_base_url: upload_cfg.public_base_url.clone(),
            staging_root: upload_cfg.staging_root(),
        },
    );

    let app_state = web::Data::new(server::AppState::new(cfg, uploads));

    info!(
        "IPFS Upload Service listening on {}:{}",
        server_cfg.host, server_cfg.port
    );
    info!("  GET  /health");
    info!("  POST /upload");
    info!("  POST /upload/track");
    info!("  POST /upload/cover");
    info!("  POST /upload/both");
    info!("  POST /upload/folder");
    info!("  POST /upload/mint/prepare");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Logger::default())
            .configure(server::configure_service)
            .wrap(server::cors())
    })
    .bind((server_cfg.host.as_str(), server_cfg.port))?
    .run()
    .await
}
