use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::{SurfaceLifetime, TaskClass, spawn};

/// Outcome of work bound to a surface lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound<T> {
	/// The work ran to completion while the surface was live.
	Ran(T),
	/// The surface was torn down first; the work was dropped.
	Dropped,
}

impl<T> Bound<T> {
	pub fn ran(self) -> Option<T> {
		match self {
			Self::Ran(value) => Some(value),
			Self::Dropped => None,
		}
	}
}

/// Runs `fut` to completion, then `then` with its output, unless `lifetime` ends first.
///
/// `then` runs only if the surface is still live after `fut` resolves, so callbacks
/// never observe a torn-down surface.
pub fn spawn_bound<F, T, R>(class: TaskClass, lifetime: SurfaceLifetime, fut: F, then: impl FnOnce(T) -> R + Send + 'static) -> JoinHandle<Bound<R>>
where
	F: Future<Output = T> + Send + 'static,
	T: Send + 'static,
	R: Send + 'static,
{
	spawn(class, async move {
		let value = tokio::select! {
			biased;
			_ = lifetime.torn_down() => return Bound::Dropped,
			value = fut => value,
		};
		if lifetime.is_torn_down() {
			return Bound::Dropped;
		}
		Bound::Ran(then(value))
	})
}

/// Runs `f` after `delay`, unless `lifetime` ends first.
pub fn spawn_deferred<R>(class: TaskClass, delay: Duration, lifetime: SurfaceLifetime, f: impl FnOnce() -> R + Send + 'static) -> JoinHandle<Bound<R>>
where
	R: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), delay_ms = delay.as_millis() as u64, "worker.spawn_deferred");
	spawn_bound(class, lifetime, tokio::time::sleep(delay), move |()| f())
}
