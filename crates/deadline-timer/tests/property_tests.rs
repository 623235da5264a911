//! Property-based tests for configuration and statistics.

use deadline_timer::{TimerConfig, TimerStatsSnapshot};
use proptest::prelude::*;
use quickcheck_macros::quickcheck;
use std::time::Duration;

proptest! {
    #[test]
    fn prop_validation_matches_field_rules(
        name_len in 0usize..12,
        arm_ms in 0u64..5_000,
        fallback_us in proptest::option::of(0u64..10_000),
        max_events in 0usize..64,
        pool_capacity in 0usize..4_096,
    ) {
        let config = TimerConfig {
            thread_name: "t".repeat(name_len),
            initial_arm_delay: Duration::from_millis(arm_ms),
            fallback_interval: fallback_us.map(Duration::from_micros),
            max_events,
            pool_capacity,
            isolate_panics: true,
        };

        let expected_valid = name_len > 0
            && arm_ms > 0
            && fallback_us != Some(0)
            && max_events > 0;
        prop_assert_eq!(config.validate().is_ok(), expected_valid);
    }

    #[test]
    fn prop_config_json_round_trip(
        arm_ms in 1u64..5_000,
        fallback_us in proptest::option::of(1u64..10_000),
        max_events in 1usize..64,
        isolate_panics in any::<bool>(),
    ) {
        let config = TimerConfig {
            initial_arm_delay: Duration::from_millis(arm_ms),
            fallback_interval: fallback_us.map(Duration::from_micros),
            max_events,
            isolate_panics,
            ..TimerConfig::default()
        };

        let json = serde_json::to_string(&config)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let decoded: TimerConfig = serde_json::from_str(&json)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(decoded, config);
    }
}

#[quickcheck]
fn partial_config_fills_defaults(max_events: u8) -> bool {
    let max_events = usize::from(max_events).max(1);
    let json = format!(r#"{{"max_events": {max_events}}}"#);
    serde_json::from_str::<TimerConfig>(&json).is_ok_and(|config| {
        config.max_events == max_events
            && config.thread_name == TimerConfig::default().thread_name
            && config.validate().is_ok()
    })
}

#[quickcheck]
fn stats_snapshot_json_round_trip(fired: u64, rearms: u64, lateness: u64) -> bool {
    let snapshot = TimerStatsSnapshot {
        tasks_fired: fired,
        timer_rearms: rearms,
        max_lateness_ns: lateness,
        ..TimerStatsSnapshot::default()
    };
    serde_json::to_string(&snapshot)
        .ok()
        .and_then(|json| serde_json::from_str::<TimerStatsSnapshot>(&json).ok())
        == Some(snapshot)
}
