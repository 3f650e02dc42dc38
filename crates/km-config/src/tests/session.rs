use crate::Config;
use crate::tests::{EnvGuard, setup_config_dir};

use std::time::Duration;

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, ok};
use serial_test::serial;

// =========================================================================
// Validation Tests - Session refresh
// =========================================================================

#[test]
#[serial]
fn given_zero_refresh_interval_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _interval = EnvGuard::set("KM_SESSION_REFRESH_INTERVAL_SECS", "0");

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_min_validity_over_max_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _validity = EnvGuard::set("KM_SESSION_MIN_VALIDITY_SECS", "3601");

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_custom_interval_when_load_then_durations_match() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _interval = EnvGuard::set("KM_SESSION_REFRESH_INTERVAL_SECS", "120");
    let _validity = EnvGuard::set("KM_SESSION_MIN_VALIDITY_SECS", "0");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.validate(), ok(anything()));
    assert_that!(config.session.refresh_interval(), eq(Duration::from_secs(120)));
    assert_that!(config.session.min_validity(), eq(Duration::ZERO));
}
