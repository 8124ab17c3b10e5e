//! Forwards `log` records from the core to the browser console.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::prelude::*;
use web_sys::console;

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug | Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Route log output to the console at `level` (`"error"`, `"warn"`,
/// `"info"`, `"debug"`, `"trace"` or `"off"`). Defaults to `"warn"`.
///
/// Safe to call more than once; later calls only change the level.
#[wasm_bindgen]
pub fn init_logging(level: Option<String>) {
    install(parse_level(level.as_deref()));
}

pub(crate) fn install(filter: LevelFilter) {
    // Fails only when a logger is already installed, which is ours.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(filter);
}

fn parse_level(level: Option<&str>) -> LevelFilter {
    level
        .and_then(|l| l.trim().parse().ok())
        .unwrap_or(LevelFilter::Warn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(None), LevelFilter::Warn);
        assert_eq!(parse_level(Some("debug")), LevelFilter::Debug);
        assert_eq!(parse_level(Some("ERROR")), LevelFilter::Error);
        assert_eq!(parse_level(Some(" off ")), LevelFilter::Off);
        assert_eq!(parse_level(Some("loud")), LevelFilter::Warn);
    }
}
