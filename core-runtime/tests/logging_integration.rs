//! Integration tests for logging system
//!
//! The global subscriber can only be installed once per process, so the
//! install/reinstall sequence lives in a single test.

use bridge_traits::time::LogLevel;
use core_runtime::logging::{init_logging, redact_if_sensitive, LogFormat, LoggingConfig};
use core_runtime::Error;

#[test]
fn test_logging_initializes_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    init_logging(config.clone()).unwrap();
    tracing::info!(album = "Trip", "Logging is up");

    let err = init_logging(config).unwrap_err();
    assert!(matches!(err, Error::LoggingInit(_)));
}

#[test]
fn test_invalid_filter_is_rejected_before_install() {
    let config = LoggingConfig::default().with_filter("core_mirror=shouty");

    let err = init_logging(config).unwrap_err();
    match err {
        Error::InvalidLogFilter { filter, .. } => assert_eq!(filter, "core_mirror=shouty"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_token_fields_are_redacted() {
    assert_eq!(redact_if_sensitive("access_token", "ya29.a0"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("refresh_token", "1//0g"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("album", "Trip"), "Trip");
}
