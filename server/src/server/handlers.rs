//! HTTP request handlers.
//!
//! Access control happens in the extractors: a handler taking [`Authenticated`]
//! or [`AdminOnly`] is never entered without a suitable token.

use actix_web::{web, HttpResponse};
use common::Result;
use log::{debug, info};
use serde_json::json;

use super::WipiServer;
use crate::models::{success, success_with, CredentialsRequest, DeauthRequest, InterfaceRequest, ScanRequest};
use crate::radio::interface_listing;
use crate::security::{AdminOnly, Authenticated};

pub const BANNER_MESSAGE: &str = "WiPi wireless control plane";

pub async fn index() -> HttpResponse {
    success(BANNER_MESSAGE)
}

pub async fn login(
    credentials: web::Json<CredentialsRequest>,
    server: web::Data<WipiServer>,
) -> Result<HttpResponse> {
    let token = server
        .authenticator
        .login(&credentials.username, &credentials.password)
        .await?;

    Ok(success_with("Authenticated", Some(json!({ "access_token": token }))))
}

pub async fn whoami(Authenticated(claims): Authenticated) -> HttpResponse {
    success(claims)
}

pub async fn list_interfaces(
    Authenticated(claims): Authenticated,
    server: web::Data<WipiServer>,
) -> Result<HttpResponse> {
    debug!("Interface listing requested by {}", claims.username);
    let listing = interface_listing(server.radio.as_ref()).await?;
    Ok(success(listing))
}

pub async fn set_monitor_mode(
    AdminOnly(claims): AdminOnly,
    request: web::Json<InterfaceRequest>,
    server: web::Data<WipiServer>,
) -> Result<HttpResponse> {
    info!(
        "{} requested monitor mode {} on {}",
        claims.username,
        if request.active { "on" } else { "off" },
        request.interface
    );
    server
        .orchestrator
        .set_monitor_mode(&request.interface, request.active)
        .await?;
    Ok(success("OK"))
}

pub async fn deauth(
    AdminOnly(claims): AdminOnly,
    request: web::Json<DeauthRequest>,
    server: web::Data<WipiServer>,
) -> Result<HttpResponse> {
    info!("{} requested deauth on {}", claims.username, request.interface);
    let job = server.orchestrator.start_deauth(request.into_inner()).await?;
    Ok(success(json!({ "job": job.summary() })))
}

pub async fn scan(
    Authenticated(_): Authenticated,
    request: web::Json<ScanRequest>,
    server: web::Data<WipiServer>,
) -> Result<HttpResponse> {
    let access_points = server.orchestrator.scan(&request.interface).await?;
    Ok(success(access_points))
}
