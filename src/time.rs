#[cfg(test)]
use std::sync::Mutex;

use chrono::{DateTime, Local, SecondsFormat, Utc};

#[cfg(test)]
static MOCK_TIME: once_cell::sync::Lazy<Mutex<u64>> =
    once_cell::sync::Lazy::new(|| Mutex::new(Local::now().timestamp_millis() as u64));

/// Moves the test clock forward. Only ever advances, so tokens issued by
/// concurrently running tests stay valid unless their expiry is tiny.
#[cfg(test)]
pub fn advance_mock_time(seconds: u64) {
    let mut guard = MOCK_TIME.lock().unwrap();
    *guard += seconds * 1000;
}

/// Current Unix time in milliseconds.
#[cfg(test)]
pub fn current_timestamp() -> u64 {
    *MOCK_TIME.lock().unwrap()
}

/// Current Unix time in milliseconds.
#[cfg(not(test))]
pub fn current_timestamp() -> u64 {
    Local::now().timestamp_millis() as u64
}

pub fn current_timestamp_secs() -> u64 {
    current_timestamp() / 1000
}

pub fn format_rfc3339(millis: u64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis as i64) {
        Some(time) => time.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rfc3339() {
        assert_eq!(format_rfc3339(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(format_rfc3339(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn test_mock_time() {
        let before = current_timestamp();
        advance_mock_time(2);
        assert!(current_timestamp() >= before + 2000);
        assert_eq!(current_timestamp_secs(), current_timestamp() / 1000);
    }
}
