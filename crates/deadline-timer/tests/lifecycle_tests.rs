//! Tests for controller lifecycle transitions.

#![expect(
    clippy::let_underscore_must_use,
    reason = "a send only fails once the receiving test has already returned"
)]

use crossbeam::channel;
use deadline_timer::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn named(name: &str) -> Result<TimerController, TimerError> {
    Ok(TimerController::new(
        TimerConfig::builder().thread_name(name).build()?,
    ))
}

#[test]
fn test_init_twice_is_init_once() -> TestResult {
    let controller = named("lc-init-twice")?;
    controller.init()?;
    controller.init()?;
    assert_eq!(controller.state(), ControllerState::Running);

    let (tx, rx) = channel::unbounded();
    controller.add_timer_task(TimerTask::once(Duration::from_millis(5), move || {
        let _ = tx.send(());
    }))?;
    rx.recv_timeout(Duration::from_secs(2))?;

    controller.shutdown()?;
    controller.join()?;
    assert_eq!(controller.stats().tasks_fired, 1);
    Ok(())
}

#[test]
fn test_add_before_init_is_rejected() -> TestResult {
    let controller = named("lc-early")?;
    let result = controller.add_timer_task(TimerTask::once(Duration::ZERO, || {}));
    assert!(matches!(result, Err(TimerError::NotInitialized)));
    assert!(matches!(
        controller.shutdown(),
        Err(TimerError::NotInitialized)
    ));
    Ok(())
}

#[test]
fn test_no_callback_after_shutdown() -> TestResult {
    let controller = named("lc-shutdown")?;
    controller.init()?;
    let hits = Arc::new(AtomicUsize::new(0));

    for ms in [100_u64, 150, 200] {
        let hits = Arc::clone(&hits);
        controller.add_timer_task(TimerTask::once(Duration::from_millis(ms), move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }))?;
    }
    controller.shutdown()?;
    controller.join()?;
    std::thread::sleep(Duration::from_millis(250));

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(controller.stats().tasks_fired, 0);
    Ok(())
}

#[test]
fn test_stopped_controller_cannot_restart() -> TestResult {
    let controller = named("lc-restart")?;
    controller.init()?;
    controller.shutdown()?;
    controller.shutdown()?;

    assert!(matches!(controller.init(), Err(TimerError::Stopped)));
    assert!(matches!(
        controller.add_timer_task(TimerTask::once(Duration::ZERO, || {})),
        Err(TimerError::Stopped)
    ));
    assert!(!controller.is_running());
    controller.join()?;
    Ok(())
}

#[test]
fn test_join_without_thread_is_ok() -> TestResult {
    let controller = named("lc-join")?;
    controller.join()?;
    controller.init()?;
    controller.shutdown()?;
    controller.join()?;
    controller.join()?;
    Ok(())
}

#[test]
fn test_invalid_config_fails_init() {
    let controller = TimerController::new(TimerConfig {
        fallback_interval: Some(Duration::ZERO),
        ..TimerConfig::default()
    });
    assert!(matches!(
        controller.init(),
        Err(TimerError::InvalidConfig(_))
    ));
    assert_eq!(controller.state(), ControllerState::Uninitialized);
}

#[test]
fn test_unisolated_panic_ends_loop() -> TestResult {
    let controller = TimerController::new(
        TimerConfig::builder()
            .thread_name("lc-unisolated")
            .isolate_panics(false)
            .build()?,
    );
    controller.init()?;

    controller.add_timer_task(TimerTask::once(Duration::from_millis(5), || {
        std::panic::panic_any("callback failure");
    }))?;

    assert!(matches!(controller.join(), Err(TimerError::LoopPanicked)));
    assert_eq!(controller.stats().callback_panics, 0);
    Ok(())
}

#[test]
fn test_pure_one_shot_arming_without_fallback() -> TestResult {
    let controller = TimerController::new(
        TimerConfig::builder()
            .thread_name("lc-no-fallback")
            .fallback_interval(None)
            .initial_arm_delay(Duration::from_millis(1))
            .build()?,
    );
    controller.init()?;

    let (tx, rx) = channel::unbounded();
    for ms in [5_u64, 15] {
        let tx = tx.clone();
        controller.add_timer_task(TimerTask::once(Duration::from_millis(ms), move || {
            let _ = tx.send(ms);
        }))?;
    }
    assert_eq!(rx.recv_timeout(Duration::from_secs(2))?, 5);
    assert_eq!(rx.recv_timeout(Duration::from_secs(2))?, 15);

    controller.shutdown()?;
    controller.join()?;
    Ok(())
}
