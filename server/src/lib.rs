pub mod jobs;
pub mod logging;
pub mod models;
pub mod radio;
pub mod security;
pub mod server;
pub mod store;

pub use server::WipiServer;
