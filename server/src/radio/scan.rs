//! Parser for `iw dev <iface> scan` output.

use common::AccessPoint;

#[derive(Default)]
struct PendingBss {
    bssid: String,
    ssid: String,
    freq_mhz: Option<f64>,
    signal_dbm: Option<f64>,
    channel: Option<i32>,
}

impl PendingBss {
    fn finish(self) -> AccessPoint {
        let freq_mhz = self.freq_mhz.unwrap_or(0.0);
        let channel = self
            .channel
            .unwrap_or_else(|| channel_from_frequency(freq_mhz.round() as u32));
        let signal = self.signal_dbm.unwrap_or(-100.0);
        let quality = signal_quality(signal);
        let db = signal.round().clamp(i8::MIN as f64, i8::MAX as f64) as i8;

        AccessPoint {
            ssid: self.ssid,
            bssid: self.bssid,
            stats: format!("Quality={:.0}/100  Signal level={} dBm", quality, db),
            frequency: freq_mhz / 1000.0,
            quality,
            db,
            channel,
        }
    }
}

/// Maps a signal level to 0-100 (-100 dBm and below is 0, -50 dBm and above is 100).
pub fn signal_quality(dbm: f64) -> f32 {
    (2.0 * (dbm + 100.0)).clamp(0.0, 100.0) as f32
}

pub fn channel_from_frequency(mhz: u32) -> i32 {
    match mhz {
        2484 => 14,
        2412..=2472 => ((mhz - 2407) / 5) as i32,
        5955..=7115 => ((mhz - 5950) / 5) as i32,
        5000..=5900 => ((mhz - 5000) / 5) as i32,
        _ => 0,
    }
}

pub fn parse_iw_scan(output: &str) -> Vec<AccessPoint> {
    let mut access_points = Vec::new();
    let mut current: Option<PendingBss> = None;

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("BSS ") {
            if let Some(done) = current.take() {
                access_points.push(done.finish());
            }
            let bssid: String = rest
                .chars()
                .take_while(|c| c.is_ascii_hexdigit() || *c == ':')
                .collect();
            current = Some(PendingBss {
                bssid: bssid.to_ascii_uppercase(),
                ..Default::default()
            });
            continue;
        }

        let bss = match current.as_mut() {
            Some(bss) => bss,
            None => continue,
        };
        let field = line.trim();

        if let Some(value) = field.strip_prefix("freq:") {
            bss.freq_mhz = value.trim().parse().ok();
        } else if let Some(value) = field.strip_prefix("signal:") {
            bss.signal_dbm = value.split_whitespace().next().and_then(|v| v.parse().ok());
        } else if let Some(value) = field.strip_prefix("SSID:") {
            bss.ssid = value.trim().to_string();
        } else if let Some(value) = field.strip_prefix("DS Parameter set: channel") {
            bss.channel = value.trim().parse().ok();
        } else if let Some(value) = field.strip_prefix("* primary channel:") {
            if bss.channel.is_none() {
                bss.channel = value.trim().parse().ok();
            }
        }
    }

    if let Some(done) = current.take() {
        access_points.push(done.finish());
    }

    access_points
}
