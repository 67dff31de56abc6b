use actix_web::HttpResponse;
use common::{DEFAULT_DEAUTH_DELAY_MS, DEFAULT_DEAUTH_PACKETS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceRequest {
    pub interface: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeauthRequest {
    pub interface: String,
    pub bssid: String,
    #[serde(default = "default_packets")]
    pub packets: u32,
    /// Milliseconds between frames.
    #[serde(default = "default_delay")]
    pub delay: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub interface: String,
}

fn default_active() -> bool {
    true
}

fn default_packets() -> u32 {
    DEFAULT_DEAUTH_PACKETS
}

fn default_delay() -> u32 {
    DEFAULT_DEAUTH_DELAY_MS
}

/// Builds the `{"success": true, "data": {...}}` envelope around `message`.
pub fn success(message: impl Serialize) -> HttpResponse {
    success_with(message, None)
}

/// Like [`success`], with extra fields merged into `data`.
pub fn success_with(message: impl Serialize, extra: Option<Value>) -> HttpResponse {
    let mut data = json!({ "message": message });
    if let (Some(Value::Object(extra)), Some(map)) = (extra, data.as_object_mut()) {
        map.extend(extra);
    }
    HttpResponse::Ok().json(json!({ "success": true, "data": data }))
}
