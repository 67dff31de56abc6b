//! Boundary to the radio hardware.
//!
//! Everything that touches interfaces, monitor mode, frame injection or
//! scanning goes through [`RadioProvider`]. [`SystemRadio`] is the Linux
//! implementation; the rest of the crate never talks to the OS directly.

pub mod inventory;
pub mod scan;
mod system;
pub mod validator;

use async_trait::async_trait;
use common::{AccessPoint, AddressFamily, HardwareAddress, RawInterface, Result};

pub use inventory::interface_listing;
pub use system::SystemRadio;
pub use validator::{ensure_present, InterfaceValidator};

/// Parameters of a deauthentication run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeauthParams {
    pub interface: String,
    pub bssid: HardwareAddress,
    pub packets: u32,
    /// Milliseconds between frames.
    pub delay: u32,
}

#[async_trait]
pub trait RadioProvider: Send + Sync {
    /// Interfaces as seen by one address family.
    async fn interfaces(&self, family: AddressFamily) -> Result<Vec<RawInterface>>;

    /// Runs the blocking state-change command; `Ok(false)` means it reported failure.
    async fn set_monitor_mode(&self, interface: &str, active: bool) -> Result<bool>;

    /// Starts frame injection in its own process and returns as soon as it is
    /// running, with the process id when one is known.
    async fn launch_deauth(&self, params: &DeauthParams) -> Result<Option<u32>>;

    async fn scan(&self, interface: &str) -> Result<Vec<AccessPoint>>;
}
