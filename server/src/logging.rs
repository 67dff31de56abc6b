//! Colourised `env_logger` setup shared by the server and the admin tool.

use chrono::Local;
use env_logger::fmt::Color;
use env_logger::Builder;
use std::io::Write;

const DEFAULT_FILTER: &str = "info";

/// Filter directives to apply: `RUST_LOG` when set and non-empty, else `info`.
pub fn filter_spec(rust_log: Option<String>) -> String {
    rust_log
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

pub fn setup_logger() {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            let mut timestamp_style = buf.style();
            let mut level_style = buf.style();
            let mut target_style = buf.style();
            let mut message_style = buf.style();

            let level_color = match record.level() {
                log::Level::Error => Color::Red,
                log::Level::Warn => Color::Yellow,
                log::Level::Info => Color::Green,
                log::Level::Debug => Color::Cyan,
                log::Level::Trace => Color::White,
            };

            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            writeln!(
                buf,
                "{} {} [{}] {}",
                timestamp_style.set_color(Color::Rgb(100, 100, 100)).value(timestamp),
                level_style.set_color(level_color).value(record.level()),
                target_style.set_color(Color::Blue).value(record.target()),
                message_style.set_color(Color::White).value(record.args())
            )
        })
        .parse_filters(&filter_spec(std::env::var("RUST_LOG").ok()))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_info() {
        assert_eq!(filter_spec(None), "info");
        assert_eq!(filter_spec(Some("  ".to_string())), "info");
    }

    #[test]
    fn test_rust_log_wins() {
        assert_eq!(
            filter_spec(Some("debug,actix_web=warn".to_string())),
            "debug,actix_web=warn"
        );
    }
}
