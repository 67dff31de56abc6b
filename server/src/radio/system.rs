use async_trait::async_trait;
use common::{AccessPoint, AddressFamily, Config, RawInterface, Result, WipiError};
use log::{debug, error, info, warn};
use std::ffi::CStr;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::scan::parse_iw_scan;
use super::{DeauthParams, RadioProvider};

/// `ARPHRD_IEEE80211_RADIOTAP`, the link type of an interface in monitor mode.
const MONITOR_LINK_TYPE: &str = "803";

/// Linux radio backed by `getifaddrs`, sysfs and external tools.
pub struct SystemRadio {
    monitor_command: String,
    deauth_command: String,
    scan_command: String,
    sysfs_root: PathBuf,
}

impl SystemRadio {
    pub fn new(monitor_command: String, deauth_command: String, scan_command: String) -> Self {
        Self {
            monitor_command,
            deauth_command,
            scan_command,
            sysfs_root: PathBuf::from("/sys/class/net"),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.monitor_command.clone(),
            config.deauth_command.clone(),
            config.scan_command.clone(),
        )
    }

    pub fn with_sysfs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sysfs_root = root.into();
        self
    }
}

fn is_monitor_mode(sysfs_root: &Path, interface: &str) -> bool {
    std::fs::read_to_string(sysfs_root.join(interface).join("type"))
        .map(|link_type| link_type.trim() == MONITOR_LINK_TYPE)
        .unwrap_or(false)
}

fn ipv4_of(addr: *const libc::sockaddr) -> String {
    if addr.is_null() {
        return String::new();
    }
    // SAFETY: caller only passes addresses whose family is AF_INET.
    let sin = unsafe { &*(addr as *const libc::sockaddr_in) };
    Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr)).to_string()
}

fn read_interfaces(family: AddressFamily, sysfs_root: &Path) -> Result<Vec<RawInterface>> {
    let wanted = match family {
        AddressFamily::Inet => libc::AF_INET,
        AddressFamily::Packet => libc::AF_PACKET,
    };

    let mut head: *mut libc::ifaddrs = std::ptr::null_mut();
    // SAFETY: getifaddrs fills `head` with a list we release below.
    if unsafe { libc::getifaddrs(&mut head) } != 0 {
        return Err(std::io::Error::last_os_error().into());
    }

    let mut found = Vec::new();
    let mut cursor = head;
    while !cursor.is_null() {
        // SAFETY: cursor walks the list returned by getifaddrs.
        let entry = unsafe { &*cursor };
        cursor = entry.ifa_next;

        if entry.ifa_addr.is_null() || entry.ifa_name.is_null() {
            continue;
        }
        let addr_family = unsafe { (*entry.ifa_addr).sa_family } as libc::c_int;
        if addr_family != wanted {
            continue;
        }

        let name = unsafe { CStr::from_ptr(entry.ifa_name) }
            .to_string_lossy()
            .into_owned();

        let (addr, mask, monitor_mode) = match family {
            AddressFamily::Inet => (ipv4_of(entry.ifa_addr), ipv4_of(entry.ifa_netmask), false),
            AddressFamily::Packet => {
                let monitor = is_monitor_mode(sysfs_root, &name);
                (String::new(), String::new(), monitor)
            }
        };

        found.push(RawInterface {
            name,
            addr,
            mask,
            flags: entry.ifa_flags as u32,
            monitor_mode,
        });
    }

    // SAFETY: head came from getifaddrs and is freed exactly once.
    unsafe { libc::freeifaddrs(head) };

    Ok(found)
}

#[async_trait]
impl RadioProvider for SystemRadio {
    async fn interfaces(&self, family: AddressFamily) -> Result<Vec<RawInterface>> {
        let sysfs_root = self.sysfs_root.clone();
        tokio::task::spawn_blocking(move || read_interfaces(family, &sysfs_root))
            .await
            .map_err(|e| WipiError::InternalError(format!("interface query panicked: {}", e)))?
    }

    async fn set_monitor_mode(&self, interface: &str, active: bool) -> Result<bool> {
        let action = if active { "start" } else { "stop" };
        debug!("Running {} {} {}", self.monitor_command, action, interface);

        let status = Command::new(&self.monitor_command)
            .arg(action)
            .arg(interface)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) => {
                if !status.success() {
                    warn!("{} {} {} exited with {}", self.monitor_command, action, interface, status);
                }
                Ok(status.success())
            }
            Err(e) => {
                warn!("Failed to run {}: {}", self.monitor_command, e);
                Ok(false)
            }
        }
    }

    async fn launch_deauth(&self, params: &DeauthParams) -> Result<Option<u32>> {
        let mut child = Command::new(&self.deauth_command)
            .arg(&params.interface)
            .arg(params.bssid.to_string())
            .arg(params.packets.to_string())
            .arg(params.delay.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| WipiError::LaunchFailed(format!("{}: {}", self.deauth_command, e)))?;

        let pid = child.id();
        let interface = params.interface.clone();
        info!("Deauth process {:?} started on {}", pid, interface);

        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => info!("Deauth on {} finished", interface),
                Ok(status) => warn!("Deauth on {} exited with {}", interface, status),
                Err(e) => error!("Lost track of deauth on {}: {}", interface, e),
            }
        });

        Ok(pid)
    }

    async fn scan(&self, interface: &str) -> Result<Vec<AccessPoint>> {
        let output = Command::new(&self.scan_command)
            .args(["dev", interface, "scan"])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                warn!("Failed to run {}: {}", self.scan_command, e);
                WipiError::ScannerInitFailed(interface.to_string())
            })?;

        if !output.status.success() {
            warn!(
                "Scan on {} failed: {}",
                interface,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(WipiError::ScannerInitFailed(interface.to_string()));
        }

        let access_points = parse_iw_scan(&String::from_utf8_lossy(&output.stdout));
        debug!("Scan on {} found {} access points", interface, access_points.len());
        Ok(access_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn fake_link(root: &Path, name: &str, link_type: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("type"), format!("{}\n", link_type)).unwrap();
    }

    #[test]
    fn test_monitor_mode_from_link_type() {
        let root = tempdir().unwrap();
        fake_link(root.path(), "wlan0mon", "803");
        fake_link(root.path(), "wlan0", "1");

        assert!(is_monitor_mode(root.path(), "wlan0mon"));
        assert!(!is_monitor_mode(root.path(), "wlan0"));
        assert!(!is_monitor_mode(root.path(), "missing0"));
    }

    #[tokio::test]
    async fn test_loopback_is_listed() {
        let root = tempdir().unwrap();
        let radio = SystemRadio::new("true".into(), "true".into(), "true".into())
            .with_sysfs_root(root.path());

        let ip_view = radio.interfaces(AddressFamily::Inet).await.unwrap();
        let lo = ip_view.iter().find(|iface| iface.name == "lo");
        if let Some(lo) = lo {
            assert_eq!(lo.addr, "127.0.0.1");
            assert!(!lo.monitor_mode);
        }
    }

    #[tokio::test]
    async fn test_failing_monitor_command_reports_false() {
        let radio = SystemRadio::new(
            "/nonexistent/monitor-tool".into(),
            "true".into(),
            "true".into(),
        );
        assert!(!radio.set_monitor_mode("wlan0", true).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_deauth_tool_is_launch_failure() {
        let radio = SystemRadio::new("true".into(), "/nonexistent/deauth-tool".into(), "true".into());
        let params = DeauthParams {
            interface: "wlan0mon".into(),
            bssid: "AA:BB:CC:DD:EE:FF".parse().unwrap(),
            packets: 1,
            delay: 1,
        };
        assert!(matches!(
            radio.launch_deauth(&params).await,
            Err(WipiError::LaunchFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_scanner_is_init_failure() {
        let radio = SystemRadio::new("true".into(), "true".into(), "/nonexistent/iw".into());
        assert!(matches!(
            radio.scan("wlan0").await,
            Err(WipiError::ScannerInitFailed(iface)) if iface == "wlan0"
        ));
    }
}
