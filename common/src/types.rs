use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::error::WipiError;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub admin: bool,
    pub iat: i64,
    pub exp: i64,
}

/// Salted PBKDF2 verifier for a stored password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordVerifier {
    pub salt: Vec<u8>,
    pub hash: Vec<u8>,
    pub iterations: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub verifier: PasswordVerifier,
    pub admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressFamily {
    /// IP-configured view (`AF_INET`): address and mask, no monitor concept.
    Inet,
    /// Link-layer view (`AF_PACKET`): flags and monitor state, no address.
    Packet,
}

/// One interface as reported by a single address-family view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInterface {
    pub name: String,
    pub addr: String,
    pub mask: String,
    pub flags: u32,
    pub monitor_mode: bool,
}

/// Merged per-interface details served by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDetails {
    pub addr: Option<String>,
    pub mask: Option<String>,
    pub flags: u32,
    pub monitor_mode: bool,
}

/// A six-octet link-layer address, e.g. a BSSID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HardwareAddress(pub [u8; 6]);

impl FromStr for HardwareAddress {
    type Err = WipiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WipiError::BadRequest("invalid BSSID".to_string());

        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 6 {
            return Err(invalid());
        }

        let mut octets = [0u8; 6];
        for (octet, part) in octets.iter_mut().zip(&parts) {
            if part.len() != 2 || !part.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }

        Ok(HardwareAddress(octets))
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}", a, b, c, d, e, g)
    }
}

/// A job row before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub interface: String,
    pub bssid: String,
    pub start: i64,
    pub packets: u32,
    pub delay: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub interface: String,
    pub bssid: String,
    pub start: i64,
    pub packets: u32,
    pub delay: u32,
    pub complete: bool,
}

impl Job {
    pub fn from_new(id: u64, new_job: NewJob) -> Self {
        Self {
            id,
            interface: new_job.interface,
            bssid: new_job.bssid,
            start: new_job.start,
            packets: new_job.packets,
            delay: new_job.delay,
            complete: false,
        }
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id,
            bssid: self.bssid.clone(),
            start: self.start,
            packets: self.packets,
            delay: self.delay,
        }
    }
}

/// The job fields echoed back to the caller that started it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: u64,
    pub bssid: String,
    pub start: i64,
    pub packets: u32,
    pub delay: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub ssid: String,
    pub bssid: String,
    pub stats: String,
    /// GHz
    pub frequency: f64,
    /// Percent
    pub quality: f32,
    /// Signal level in dBm
    pub db: i8,
    pub channel: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardware_address_parse() {
        let addr: HardwareAddress = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(addr.0, [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(addr.to_string(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_hardware_address_octet_count() {
        for input in ["AA:BB:CC:DD:EE", "AA:BB:CC:DD:EE:FF:00", "", "AABBCCDDEEFF"] {
            assert!(
                matches!(input.parse::<HardwareAddress>(), Err(WipiError::BadRequest(_))),
                "{} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_hardware_address_rejects_bad_octets() {
        assert!("AA:BB:CC:DD:EE:GG".parse::<HardwareAddress>().is_err());
        assert!("AA:BB:CC:DD:EE:F".parse::<HardwareAddress>().is_err());
        assert!("AA:BB:CC:DD:EE:+F".parse::<HardwareAddress>().is_err());
    }
}
