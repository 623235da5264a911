//! Property-based tests for deadline arithmetic and heap ordering.

use deadline_core::{CoreError, Deadline, DeadlineHeap, NANOS_PER_SEC, TimerTask};
use proptest::prelude::*;
use quickcheck_macros::quickcheck;
use std::time::Duration;

proptest! {
    #[test]
    fn test_new_keeps_nanos_below_one_second(secs in 0..u64::MAX / 2, nanos in any::<u32>()) {
        let d = Deadline::new(secs, nanos);
        prop_assert!(d.subsec_nanos() < NANOS_PER_SEC);
        prop_assert_eq!(d.as_duration(), Duration::new(secs, 0) + Duration::from_nanos(u64::from(nanos)));
    }

    #[test]
    fn test_checked_add_matches_duration_add(
        secs in 0..1_000_000_000u64,
        nanos in 0..NANOS_PER_SEC,
        interval_ms in 0..10_000_000u64,
    ) {
        let base = Deadline::new(secs, nanos);
        let interval = Duration::from_millis(interval_ms);
        let sum = base.checked_add(interval);

        prop_assert!(sum.is_ok());
        if let Ok(sum) = sum {
            prop_assert_eq!(sum.as_duration(), base.as_duration() + interval);
            prop_assert!(sum.subsec_nanos() < NANOS_PER_SEC);
            prop_assert!(sum >= base);
        }
    }

    #[test]
    fn test_heap_pops_non_decreasing(
        offsets in prop::collection::vec((0..1_000u64, 0..NANOS_PER_SEC), 1..200),
    ) {
        let anchor = Deadline::new(1_000, 0);
        let mut heap = DeadlineHeap::new();

        for (secs, nanos) in &offsets {
            let mut task = TimerTask::once(Duration::new(*secs, *nanos), || {})
                .with_create_time(anchor);
            prop_assert!(task.schedule_from(anchor).is_ok());
            heap.push(Box::new(task));
        }

        let mut last = Deadline::ZERO;
        let mut count = 0usize;
        while let Some(task) = heap.pop_earliest() {
            prop_assert!(task.deadline() >= last);
            last = task.deadline();
            count += 1;
        }
        prop_assert_eq!(count, offsets.len());
    }

    #[test]
    fn test_pop_due_never_returns_future_task(
        intervals_ms in prop::collection::vec(0..500u64, 1..50),
        now_ms in 0..500u64,
    ) {
        let anchor = Deadline::new(10, 0);
        let mut heap = DeadlineHeap::new();
        for ms in &intervals_ms {
            let mut task = TimerTask::once(Duration::from_millis(*ms), || {})
                .with_create_time(anchor);
            prop_assert!(task.schedule_from(anchor).is_ok());
            heap.push(Box::new(task));
        }

        let now = Deadline::new(10, 0).checked_add(Duration::from_millis(now_ms));
        prop_assert!(now.is_ok());
        if let Ok(now) = now {
            let mut due = 0usize;
            while let Some(task) = heap.pop_due(now) {
                prop_assert!(task.deadline() <= now);
                due += 1;
            }
            let expected = intervals_ms.iter().filter(|ms| **ms <= now_ms).count();
            prop_assert_eq!(due, expected);
        }
    }
}

#[quickcheck]
fn recurring_chain_has_no_drift(interval_ms: u16, firings: u8, late_by_ms: Vec<u16>) -> bool {
    let interval = Duration::from_millis(u64::from(interval_ms));
    let create = Deadline::new(500, 123_456_789);
    let mut task = TimerTask::recurring(interval, || {});

    if interval.is_zero() {
        return task.schedule_from(create) == Err(CoreError::ZeroRecurringInterval);
    }
    if task.schedule_from(create).is_err() {
        return false;
    }

    for k in 1..u32::from(firings) {
        // Resubmission happens at some arbitrary later time; it must not matter.
        let lateness = late_by_ms
            .get(k as usize % late_by_ms.len().max(1))
            .copied()
            .unwrap_or(0);
        let Ok(now) = task.deadline().checked_add(Duration::from_millis(u64::from(lateness)))
        else {
            return false;
        };
        if task.schedule_from(now).is_err() {
            return false;
        }
        let Ok(expected) = create.checked_add(interval * (k + 1)) else {
            return false;
        };
        if task.deadline() != expected {
            return false;
        }
    }
    task.create_time() == create
}

#[quickcheck]
fn saturating_duration_since_is_non_negative(a: (u32, u32), b: (u32, u32)) -> bool {
    let x = Deadline::new(u64::from(a.0), a.1);
    let y = Deadline::new(u64::from(b.0), b.1);
    let d = x.saturating_duration_since(y);
    if x >= y {
        y.checked_add(d) == Ok(x)
    } else {
        d == Duration::ZERO
    }
}
