//! Main entry point for the WiPi control plane

use actix_web::main as actix_main;
use common::{Config, Result};
use log::info;
use std::sync::Arc;
use wipi_server::logging::setup_logger;
use wipi_server::radio::SystemRadio;
use wipi_server::security::TokenService;
use wipi_server::store::Stores;
use wipi_server::WipiServer;

const BANNER: &str = r#"
╔═══════════════════════════════════════════════════════════════════╗
║                                                                   ║
║   ██╗    ██╗██╗██████╗ ██╗                                        ║
║   ██║    ██║██║██╔══██╗██║                                        ║
║   ██║ █╗ ██║██║██████╔╝██║                                        ║
║   ██║███╗██║██║██╔═══╝ ██║                                        ║
║   ╚███╔███╔╝██║██║     ██║                                        ║
║    ╚══╝╚══╝ ╚═╝╚═╝     ╚═╝                                        ║
║                                                                   ║
║   Wireless Control Plane v0.1.0                                   ║
║                                                                   ║
╚═══════════════════════════════════════════════════════════════════╝
"#;

#[actix_main]
async fn main() -> Result<()> {
    setup_logger();

    println!("{}", BANNER);

    info!("Starting WiPi control plane...");

    let config = Config::load()?;
    info!("Configuration loaded successfully");

    info!("Opening {:?} store...", config.store_backend);
    let stores = Stores::open(&config)?;
    info!("✓ Store ready");

    info!("Loading token keys...");
    let tokens = Arc::new(TokenService::from_config(&config)?);
    info!("✓ Token service ready ({}s lifetime)", tokens.lifetime_secs());

    let radio = Arc::new(SystemRadio::from_config(&config));
    info!(
        "✓ Radio provider ready (monitor: {}, deauth: {}, scan: {})",
        config.monitor_command, config.deauth_command, config.scan_command
    );

    let server = WipiServer::new(&config, stores, tokens, radio)?;
    info!("✓ Server instance created successfully");

    server.start().await
}
