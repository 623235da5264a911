//! Unit tests for the public task-model API.

use deadline_core::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn test_pooled_task_reused_without_residue() -> TestResult {
    let pool = TaskPool::new(8);
    let fired = Arc::new(AtomicUsize::new(0));

    let mut first = pool.acquire();
    let counter = Arc::clone(&fired);
    first.set_callback(move || {
        counter.fetch_add(1, Ordering::Relaxed);
    });
    first.set_interval(Duration::from_millis(5));
    first.set_recurring(true);
    first.schedule_from(Deadline::new(42, 0))?;
    first.run();
    pool.recycle(first);

    let mut second = pool.acquire();
    assert!(!second.has_callback());
    assert!(!second.is_recurring());
    assert!(second.create_time().is_zero());
    assert!(second.deadline().is_zero());

    // Running the recycled task must not reach the old callback.
    second.run();
    assert_eq!(fired.load(Ordering::Relaxed), 1);

    second.set_interval(Duration::from_millis(1));
    let deadline = second.schedule_from(Deadline::new(7, 0))?;
    assert_eq!(deadline, Deadline::new(7, 1_000_000));
    Ok(())
}

#[test]
fn test_concurrent_acquire_and_recycle() {
    let pool = Arc::new(TaskPool::new(64));
    let threads: usize = 8;
    let rounds: usize = 1_000;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for _ in 0..rounds {
                    let mut task = pool.acquire();
                    assert!(!task.has_callback());
                    task.set_callback(|| {});
                    pool.recycle(task);
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().is_ok(), "thread panicked unexpectedly");
    }

    assert!(pool.len() <= pool.capacity());
    assert!(pool.len() >= 1);
}

#[test]
fn test_heap_equal_deadlines_all_returned() -> TestResult {
    let anchor = Deadline::new(3, 0);
    let mut heap = DeadlineHeap::new();
    for _ in 0..5 {
        let mut task = TimerTask::once(Duration::from_millis(10), || {}).with_create_time(anchor);
        task.schedule_from(anchor)?;
        heap.push(Box::new(task));
    }

    let mut count = 0;
    while let Some(task) = heap.pop_due(Deadline::new(3, 10_000_000)) {
        assert_eq!(task.deadline(), Deadline::new(3, 10_000_000));
        count += 1;
    }
    assert_eq!(count, 5);
    Ok(())
}

#[test]
fn test_debug_hides_callback() {
    let task = TimerTask::recurring(Duration::from_millis(3), || {});
    let rendered = format!("{task:?}");
    assert!(rendered.contains("has_callback: true"));
    assert!(rendered.contains("recurring: true"));
}

#[test]
fn test_deadline_duration_conversions() {
    let d = Deadline::from(Duration::new(12, 34));
    assert_eq!(d, Deadline::new(12, 34));
    assert_eq!(Duration::from(d), Duration::new(12, 34));
    assert_eq!(d.checked_sub(Duration::from_secs(13)), None);
    assert_eq!(
        d.checked_sub(Duration::from_secs(2)),
        Some(Deadline::new(10, 34))
    );
}

#[test]
fn test_core_error_is_std_error() {
    let err: Box<dyn std::error::Error> =
        Box::new(CoreError::deadline_overflow(Deadline::new(1, 0), Duration::MAX));
    assert!(err.to_string().contains("overflow"));
}
