use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

use crate::TaskClass;

/// Runtime that tasks are spawned on.
///
/// Hosts running inside tokio get their own runtime. Hosts that are not (an editor
/// driving the highlighter from a synchronous loop) share a small process-wide one
/// that is started on first use.
fn handle() -> Handle {
	match Handle::try_current() {
		Ok(handle) => handle,
		Err(_) => fallback_runtime().handle().clone(),
	}
}

fn fallback_runtime() -> &'static Runtime {
	static FALLBACK: OnceLock<Runtime> = OnceLock::new();
	FALLBACK.get_or_init(|| {
		Builder::new_multi_thread()
			.enable_all()
			.worker_threads(1)
			.thread_name("codefence-loader")
			.build()
			.expect("codefence-worker: cannot start the fallback tokio runtime")
	})
}

/// Spawns an async highlighter task.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	debug_assert!(!class.is_blocking(), "blocking work goes through spawn_blocking");
	tracing::trace!(worker_class = class.as_str(), "worker.spawn");
	handle().spawn(fut)
}

/// Runs `f` on the blocking pool.
pub fn spawn_blocking<F, R>(class: TaskClass, f: F) -> JoinHandle<R>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn_blocking");
	handle().spawn_blocking(f)
}
