//! HTTP surface of the control plane.
//!
//! Wires the security, radio, job and store layers into an actix-web app.

use actix_web::{error, web, App, HttpRequest, HttpResponse, HttpServer};
use common::{Config, Result};
use log::info;
use serde_json::json;
use std::sync::Arc;

use crate::jobs::JobOrchestrator;
use crate::radio::RadioProvider;
use crate::security::{AccessGuard, Authenticator, PasswordHasher, TokenService};
use crate::store::Stores;

pub mod handlers;

/// Shared application state, cloned into every actix worker.
#[derive(Clone)]
pub struct WipiServer {
    pub authenticator: Authenticator,
    pub guard: AccessGuard,
    pub orchestrator: JobOrchestrator,
    pub radio: Arc<dyn RadioProvider>,
    bind_address: String,
}

impl WipiServer {
    pub fn new(
        config: &Config,
        stores: Stores,
        tokens: Arc<TokenService>,
        radio: Arc<dyn RadioProvider>,
    ) -> Result<Self> {
        let hasher = PasswordHasher::new(config.password_iterations)?;

        Ok(Self {
            authenticator: Authenticator::new(stores.credentials.clone(), tokens.clone(), hasher),
            guard: AccessGuard::new(tokens),
            orchestrator: JobOrchestrator::new(radio.clone(), stores.jobs),
            radio,
            bind_address: config.bind_address.clone(),
        })
    }

    /// Registers shared state and every route on `cfg`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.clone()))
            .app_data(web::Data::new(self.guard.clone()))
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .service(web::resource("/").route(web::get().to(handlers::index)))
            .service(web::resource("/auth").route(web::post().to(handlers::login)))
            .service(web::resource("/whoami").route(web::get().to(handlers::whoami)))
            .service(
                web::scope("/interfaces")
                    .service(web::resource("").route(web::get().to(handlers::list_interfaces)))
                    .service(
                        web::resource("/monitor_mode")
                            .route(web::post().to(handlers::set_monitor_mode)),
                    )
                    .service(web::resource("/deauth").route(web::post().to(handlers::deauth))),
            )
            .service(web::resource("/scan").route(web::post().to(handlers::scan)));
    }

    pub async fn start(&self) -> Result<()> {
        let server = self.clone();

        info!("Starting HTTP server on {}", self.bind_address);
        let http_server = HttpServer::new(move || {
            App::new()
                .configure(|cfg| server.configure(cfg))
                .wrap(
                    actix_cors::Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
        })
        .bind(&self.bind_address)?;

        http_server.run().await?;
        info!("HTTP server stopped");
        Ok(())
    }
}

/// Unreadable or mistyped JSON bodies get a 422 in the usual envelope.
fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = json!({
        "success": false,
        "data": { "message": err.to_string() }
    });
    error::InternalError::from_response(err, HttpResponse::UnprocessableEntity().json(body)).into()
}
