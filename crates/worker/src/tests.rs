use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;

#[tokio::test(start_paused = true)]
async fn test_deferred_runs_after_delay() {
	let hits = Arc::new(AtomicUsize::new(0));
	let counter = hits.clone();
	let handle = spawn_deferred(TaskClass::Interactive, Duration::from_millis(10), SurfaceLifetime::new(), move || {
		counter.fetch_add(1, Ordering::SeqCst)
	});

	tokio::time::sleep(Duration::from_millis(5)).await;
	assert_eq!(hits.load(Ordering::SeqCst), 0, "must not run before the delay");

	assert_eq!(handle.await.unwrap(), Bound::Ran(0));
	assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_deferred_is_dropped_after_teardown() {
	let lifetime = SurfaceLifetime::new();
	let hits = Arc::new(AtomicUsize::new(0));
	let counter = hits.clone();
	let handle = spawn_deferred(TaskClass::Interactive, Duration::from_millis(10), lifetime.clone(), move || {
		counter.fetch_add(1, Ordering::SeqCst);
	});

	lifetime.teardown();
	assert_eq!(handle.await.unwrap(), Bound::Dropped);
	assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_bound_skips_callback_when_torn_down_during_wait() {
	let lifetime = SurfaceLifetime::new();
	let (tx, rx) = tokio::sync::oneshot::channel::<u32>();
	let handle = spawn_bound(TaskClass::Background, lifetime.clone(), async move { rx.await.unwrap_or(0) }, |v| v * 2);

	lifetime.teardown();
	let _ = tx.send(21);
	assert_eq!(handle.await.unwrap(), Bound::Dropped);
}

#[tokio::test]
async fn test_bound_runs_callback_with_output() {
	let handle = spawn_bound(TaskClass::Background, SurfaceLifetime::new(), async { 21u32 }, |v| v * 2);
	assert_eq!(handle.await.unwrap().ran(), Some(42));
}
