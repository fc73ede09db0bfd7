//! Deferred and follow-up passes.
//!
//! The first pass after mounting runs on a short timer instead of inside the
//! mount, so the initial paint is not blocked. When a pass is incomplete the
//! scheduler awaits the pending grammar loads and then dispatches one
//! [`PassMeta::GrammarLoaded`] cycle. Loads from further incomplete passes join
//! the batch still being awaited instead of starting another waiter. All of this
//! work is bound to the surface lifetime and silently dropped on teardown.

use std::sync::Arc;
use std::time::Duration;

use codefence_language::GrammarLoad;
use codefence_worker::{SurfaceLifetime, TaskClass, spawn_bound, spawn_deferred};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::change::{Dispatch, PassMeta};

/// A mounted editing surface: where passes are dispatched and how long it lives.
#[derive(Clone)]
pub struct Surface {
	dispatcher: Arc<dyn Dispatch>,
	lifetime: SurfaceLifetime,
}

impl std::fmt::Debug for Surface {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Surface").field("lifetime", &self.lifetime).finish_non_exhaustive()
	}
}

impl Surface {
	pub fn new(dispatcher: impl Dispatch, lifetime: SurfaceLifetime) -> Self {
		Self {
			dispatcher: Arc::new(dispatcher),
			lifetime,
		}
	}
}

#[derive(Debug)]
pub struct DeferredScheduler {
	delay: Duration,
	surface: Option<Surface>,
	/// Feeds the waiter of the current follow-up batch. Closed once the batch is done.
	batch: Option<mpsc::UnboundedSender<GrammarLoad>>,
}

impl DeferredScheduler {
	pub fn new(delay: Duration) -> Self {
		Self {
			delay,
			surface: None,
			batch: None,
		}
	}

	/// Attaches `surface`. A previously attached surface is torn down first, so its
	/// pending passes never reach either surface.
	pub fn attach(&mut self, surface: Surface) {
		self.detach();
		self.surface = Some(surface);
	}

	/// Tears the attached surface down, dropping every pending pass.
	pub fn detach(&mut self) {
		if let Some(surface) = self.surface.take() {
			surface.lifetime.teardown();
		}
		self.batch = None;
	}

	/// Returns the attached surface while it is live.
	fn live_surface(&self) -> Option<&Surface> {
		self.surface.as_ref().filter(|surface| !surface.lifetime.is_torn_down())
	}

	pub fn is_attached(&self) -> bool {
		self.live_surface().is_some()
	}

	/// Schedules the deferred first pass. Returns false without a live surface.
	pub fn schedule_deferred_pass(&self) -> bool {
		let Some(surface) = self.live_surface() else {
			return false;
		};
		let dispatcher = surface.dispatcher.clone();
		spawn_deferred(TaskClass::Interactive, self.delay, surface.lifetime.clone(), move || {
			dispatcher.dispatch(PassMeta::DeferredPass);
		});
		true
	}

	/// Awaits `loads`, then dispatches one follow-up pass.
	///
	/// Without a live surface the loads are not awaited; mounting schedules a
	/// deferred pass that picks them up again.
	pub fn follow_up(&mut self, loads: Vec<GrammarLoad>) {
		if loads.is_empty() {
			return;
		}
		let Some(surface) = self.live_surface() else {
			debug!(loads = loads.len(), "highlight.follow_up.no_surface");
			return;
		};
		let dispatcher = surface.dispatcher.clone();
		let lifetime = surface.lifetime.clone();

		let loads = match &self.batch {
			Some(batch) => match send_all(batch, loads) {
				Ok(()) => {
					trace!("highlight.follow_up.joined_batch");
					return;
				}
				Err(rest) => rest,
			},
			None => loads,
		};

		let (tx, rx) = mpsc::unbounded_channel();
		for load in loads {
			let _ = tx.send(load);
		}
		self.batch = Some(tx);
		spawn_bound(TaskClass::Background, lifetime, await_batch(rx), move |()| {
			dispatcher.dispatch(PassMeta::GrammarLoaded);
		});
	}
}

/// Sends every load, returning the unsent ones once the batch has closed.
fn send_all(batch: &mpsc::UnboundedSender<GrammarLoad>, loads: Vec<GrammarLoad>) -> Result<(), Vec<GrammarLoad>> {
	let mut loads = loads.into_iter();
	while let Some(load) = loads.next() {
		if let Err(mpsc::error::SendError(load)) = batch.send(load) {
			return Err(std::iter::once(load).chain(loads).collect());
		}
	}
	Ok(())
}

async fn await_batch(mut rx: mpsc::UnboundedReceiver<GrammarLoad>) {
	while let Ok(load) = rx.try_recv() {
		wait(load).await;
	}
	rx.close();
	while let Some(load) = rx.recv().await {
		wait(load).await;
	}
}

async fn wait(load: GrammarLoad) {
	let language = load.language().to_string();
	// Failures are logged by the registry; the follow-up pass retries or gives up.
	if let Err(error) = load.finished().await {
		debug!(%language, %error, "highlight.follow_up.load_failed");
	}
}
