use common::{AddressFamily, RawInterface, Result, WipiError};
use log::debug;
use std::sync::Arc;

use super::RadioProvider;

/// Finds `requested` in a link-layer inventory.
pub fn ensure_present<'a>(inventory: &'a [RawInterface], requested: &str) -> Result<&'a RawInterface> {
    inventory
        .iter()
        .find(|iface| iface.name == requested)
        .ok_or_else(|| WipiError::InterfaceNotFound(requested.to_string()))
}

/// Checks requested interfaces against the live link-layer inventory.
///
/// Monitor mode renames and recreates interfaces, so every call queries the
/// provider again.
#[derive(Clone)]
pub struct InterfaceValidator {
    radio: Arc<dyn RadioProvider>,
}

impl InterfaceValidator {
    pub fn new(radio: Arc<dyn RadioProvider>) -> Self {
        Self { radio }
    }

    /// Returns the live link-layer record for `name`.
    pub async fn require(&self, name: &str) -> Result<RawInterface> {
        let live = self.radio.interfaces(AddressFamily::Packet).await?;
        debug!("Link-layer inventory has {} interfaces", live.len());
        ensure_present(&live, name).cloned()
    }
}
