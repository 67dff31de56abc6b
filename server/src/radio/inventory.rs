use common::{AddressFamily, InterfaceDetails, RawInterface, Result};
use std::collections::BTreeMap;

use super::RadioProvider;

/// Queries both address-family views and merges them by interface name.
pub async fn interface_listing(radio: &dyn RadioProvider) -> Result<BTreeMap<String, InterfaceDetails>> {
    let ip_view = radio.interfaces(AddressFamily::Inet).await?;
    let link_view = radio.interfaces(AddressFamily::Packet).await?;
    Ok(merge_views(&ip_view, &link_view))
}

/// Builds the listing from the link-layer view and overlays IPv4 address and
/// mask. Names only present in the IPv4 view are left out.
pub fn merge_views(
    ip_view: &[RawInterface],
    link_view: &[RawInterface],
) -> BTreeMap<String, InterfaceDetails> {
    let mut merged: BTreeMap<String, InterfaceDetails> = link_view
        .iter()
        .map(|iface| {
            let details = InterfaceDetails {
                addr: non_empty(&iface.addr).filter(|addr| !addr.ends_with(".0")),
                mask: non_empty(&iface.mask),
                flags: iface.flags,
                monitor_mode: iface.monitor_mode,
            };
            (iface.name.clone(), details)
        })
        .collect();

    for iface in ip_view {
        if let Some(details) = merged.get_mut(&iface.name) {
            details.addr = non_empty(&iface.addr);
            details.mask = non_empty(&iface.mask);
        }
    }

    merged
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, addr: &str, mask: &str, flags: u32, monitor_mode: bool) -> RawInterface {
        RawInterface {
            name: name.to_string(),
            addr: addr.to_string(),
            mask: mask.to_string(),
            flags,
            monitor_mode,
        }
    }

    #[test]
    fn test_ip_view_overlays_link_view() {
        let ip_view = vec![raw("eth0", "192.168.1.20", "255.255.255.0", 4163, false)];
        let link_view = vec![
            raw("eth0", "", "", 4163, false),
            raw("wlan0mon", "", "", 4099, true),
        ];

        let merged = merge_views(&ip_view, &link_view);

        let eth0 = &merged["eth0"];
        assert_eq!(eth0.addr.as_deref(), Some("192.168.1.20"));
        assert_eq!(eth0.mask.as_deref(), Some("255.255.255.0"));
        assert_eq!(eth0.flags, 4163);

        let mon = &merged["wlan0mon"];
        assert!(mon.monitor_mode);
        assert_eq!(mon.addr, None);
        assert_eq!(mon.mask, None);
    }

    #[test]
    fn test_ip_only_interfaces_are_dropped() {
        let ip_view = vec![raw("tun0", "10.8.0.2", "255.255.255.0", 4305, false)];
        let link_view = vec![raw("wlan0", "", "", 4099, false)];

        let merged = merge_views(&ip_view, &link_view);
        assert!(!merged.contains_key("tun0"));
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_network_style_link_address_is_hidden() {
        let link_view = vec![raw("wlan0", "0.0.0.0", "", 4099, false)];
        let merged = merge_views(&[], &link_view);
        assert_eq!(merged["wlan0"].addr, None);
    }

    #[test]
    fn test_last_ip_entry_wins() {
        let ip_view = vec![
            raw("eth0", "10.0.0.1", "255.0.0.0", 4163, false),
            raw("eth0", "10.0.0.2", "255.255.0.0", 4163, false),
        ];
        let link_view = vec![raw("eth0", "", "", 4163, false)];

        let merged = merge_views(&ip_view, &link_view);
        assert_eq!(merged["eth0"].addr.as_deref(), Some("10.0.0.2"));
        assert_eq!(merged["eth0"].mask.as_deref(), Some("255.255.0.0"));
    }
}
