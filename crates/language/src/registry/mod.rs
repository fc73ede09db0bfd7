//! Process-wide grammar registry.
//!
//! The registry tracks, per language tag, whether its grammar is unregistered,
//! loading or registered. Loads are single-flight: concurrent callers share one
//! [`GrammarLoad`] handle, and the grammar is registered exactly once when the
//! load completes. A registered grammar is never unregistered.
//!
//! Failed loads return the tag to `Unregistered` with a failure count. The next
//! [`GrammarRegistry::ensure_loaded`] schedules a retry after an exponential
//! backoff; once [`RetryPolicy::max_attempts`] loads have failed the tag is
//! treated as unknown.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use codefence_worker::{TaskClass, spawn};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::builtin::BuiltinLoader;
use crate::catalog::is_plain;
use crate::grammar::{Grammar, GrammarError};

/// Source of grammars for a set of language tags.
#[async_trait]
pub trait GrammarLoader: Send + Sync + 'static {
	/// Whether this loader can produce a grammar for `language`.
	fn provides(&self, language: &str) -> bool;

	/// Produces the grammar for `language`.
	async fn load(&self, language: &str) -> Result<Arc<dyn Grammar>, GrammarError>;
}

/// Retry behaviour for failed grammar loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Failed loads after which a tag is treated as unknown.
	pub max_attempts: u32,
	/// Delay before the first retry. Doubles with every further failure.
	pub backoff_base: Duration,
	/// Upper bound for the retry delay.
	pub backoff_max: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			backoff_base: Duration::from_millis(250),
			backoff_max: Duration::from_secs(10),
		}
	}
}

impl RetryPolicy {
	/// Delay before retrying after `failures` consecutive failures.
	pub fn backoff(&self, failures: u32) -> Duration {
		if failures == 0 {
			return Duration::ZERO;
		}
		let factor = 2u32.saturating_pow(failures - 1);
		self.backoff_base.saturating_mul(factor).min(self.backoff_max)
	}

	pub fn gives_up(&self, failures: u32) -> bool {
		failures >= self.max_attempts
	}
}

/// Result of a finished load, shared by every waiter.
pub type LoadOutcome = Result<(), Arc<GrammarError>>;

/// Observable state of a language tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarStatus {
	/// Plain text, or no loader provides the tag.
	Unknown,
	/// Known, not loaded. `failures` counts failed loads so far.
	Unregistered { failures: u32 },
	/// A load is in flight.
	Loading,
	/// The grammar is available.
	Registered,
	/// Every allowed load failed; the tag is treated as unknown.
	GaveUp { failures: u32 },
}

/// Handle to an in-flight grammar load.
///
/// Clones observe the same load. Awaiting [`GrammarLoad::finished`] resolves after
/// the registry has applied the outcome, so a successful load is already visible
/// through [`GrammarRegistry::is_ready`].
#[derive(Debug, Clone)]
pub struct GrammarLoad {
	id: u64,
	language: Arc<str>,
	rx: watch::Receiver<Option<LoadOutcome>>,
}

impl GrammarLoad {
	/// Identifier shared by all handles of the same load.
	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn language(&self) -> &str {
		&self.language
	}

	/// Whether the outcome is already available.
	pub fn is_finished(&self) -> bool {
		self.rx.borrow().is_some()
	}

	/// Waits for the load to finish.
	pub async fn finished(mut self) -> LoadOutcome {
		let abandoned = || Arc::new(GrammarError::Abandoned(self.language.to_string()));
		match self.rx.wait_for(Option::is_some).await {
			Ok(outcome) => outcome.clone().unwrap_or_else(|| Err(abandoned())),
			Err(_) => Err(abandoned()),
		}
	}
}

struct InFlight {
	id: u64,
	tx: watch::Sender<Option<LoadOutcome>>,
	rx: watch::Receiver<Option<LoadOutcome>>,
}

enum Slot {
	Unregistered { failures: u32, retry_at: Option<Instant> },
	Loading { failures: u32, load: InFlight },
	Registered(Arc<dyn Grammar>),
}

struct Inner {
	loaders: Vec<Arc<dyn GrammarLoader>>,
	retry: RetryPolicy,
	slots: Mutex<FxHashMap<Arc<str>, Slot>>,
	next_id: AtomicU64,
}

/// Shared grammar registry service.
///
/// Cheap to clone; clones share state. Construct one per process (or per test).
#[derive(Clone)]
pub struct GrammarRegistry {
	inner: Arc<Inner>,
}

impl std::fmt::Debug for GrammarRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GrammarRegistry")
			.field("loaders", &self.inner.loaders.len())
			.field("retry", &self.inner.retry)
			.field("slots", &self.inner.slots.lock().len())
			.finish()
	}
}

impl Default for GrammarRegistry {
	fn default() -> Self {
		Self::builtin(RetryPolicy::default())
	}
}

/// Builder for [`GrammarRegistry`].
#[derive(Default)]
pub struct GrammarRegistryBuilder {
	loaders: Vec<Arc<dyn GrammarLoader>>,
	retry: RetryPolicy,
}

impl GrammarRegistryBuilder {
	/// Adds a loader. Loaders are consulted in insertion order.
	pub fn loader(mut self, loader: impl GrammarLoader) -> Self {
		self.loaders.push(Arc::new(loader));
		self
	}

	pub fn retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	pub fn build(self) -> GrammarRegistry {
		GrammarRegistry {
			inner: Arc::new(Inner {
				loaders: self.loaders,
				retry: self.retry,
				slots: Mutex::new(FxHashMap::default()),
				next_id: AtomicU64::new(1),
			}),
		}
	}
}

impl GrammarRegistry {
	pub fn builder() -> GrammarRegistryBuilder {
		GrammarRegistryBuilder::default()
	}

	/// Registry backed by the built-in grammars.
	pub fn builtin(retry: RetryPolicy) -> Self {
		Self::builder().loader(BuiltinLoader::new()).retry(retry).build()
	}

	pub fn retry_policy(&self) -> RetryPolicy {
		self.inner.retry
	}

	fn loader_for(&self, language: &str) -> Option<Arc<dyn GrammarLoader>> {
		self.inner.loaders.iter().find(|loader| loader.provides(language)).cloned()
	}

	/// Whether the grammar for `language` is registered.
	pub fn is_ready(&self, language: &str) -> bool {
		matches!(self.inner.slots.lock().get(language), Some(Slot::Registered(_)))
	}

	/// Returns the registered grammar for `language`.
	pub fn grammar(&self, language: &str) -> Option<Arc<dyn Grammar>> {
		match self.inner.slots.lock().get(language) {
			Some(Slot::Registered(grammar)) => Some(grammar.clone()),
			_ => None,
		}
	}

	/// Reports the state of `language`.
	pub fn status(&self, language: &str) -> GrammarStatus {
		if is_plain(Some(language)) {
			return GrammarStatus::Unknown;
		}
		match self.inner.slots.lock().get(language) {
			Some(Slot::Registered(_)) => GrammarStatus::Registered,
			Some(Slot::Loading { .. }) => GrammarStatus::Loading,
			Some(Slot::Unregistered { failures, .. }) if self.inner.retry.gives_up(*failures) => GrammarStatus::GaveUp { failures: *failures },
			Some(Slot::Unregistered { failures, .. }) => GrammarStatus::Unregistered { failures: *failures },
			None if self.loader_for(language).is_some() => GrammarStatus::Unregistered { failures: 0 },
			None => GrammarStatus::Unknown,
		}
	}

	/// Starts loading `language` unless it is ready, loading, or not loadable.
	///
	/// Returns the in-flight handle, shared with earlier callers when a load is
	/// already running. Returns `None` when the grammar is registered, the tag is
	/// plain or unknown, or every allowed load has failed.
	pub fn ensure_loaded(&self, language: &str) -> Option<GrammarLoad> {
		if is_plain(Some(language)) {
			return None;
		}

		let mut slots = self.inner.slots.lock();
		let (failures, retry_at) = match slots.get(language) {
			Some(Slot::Registered(_)) => return None,
			Some(Slot::Loading { load, .. }) => {
				return Some(GrammarLoad {
					id: load.id,
					language: language.into(),
					rx: load.rx.clone(),
				});
			}
			Some(Slot::Unregistered { failures, .. }) if self.inner.retry.gives_up(*failures) => return None,
			Some(Slot::Unregistered { failures, retry_at }) => (*failures, *retry_at),
			None => (0, None),
		};
		let loader = self.loader_for(language)?;

		let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
		let (tx, rx) = watch::channel(None);
		let language: Arc<str> = language.into();
		slots.insert(
			language.clone(),
			Slot::Loading {
				failures,
				load: InFlight { id, tx, rx: rx.clone() },
			},
		);
		drop(slots);

		debug!(language = %language, load_id = id, failures, "grammar.load.start");
		let guard = LoadGuard {
			registry: self.clone(),
			language: language.clone(),
			id,
			done: false,
		};
		spawn(TaskClass::Background, async move {
			let mut guard = guard;
			if let Some(at) = retry_at {
				tokio::time::sleep_until(at).await;
			}
			let result = loader.load(&guard.language).await;
			guard.finish(result);
		});

		Some(GrammarLoad { id, language, rx })
	}

	/// Registers `grammar` for `language` synchronously.
	///
	/// An in-flight load is resolved as successful and its own result discarded.
	/// Returns `false` and keeps the existing grammar if one is already registered.
	pub fn register(&self, language: &str, grammar: Arc<dyn Grammar>) -> bool {
		let mut slots = self.inner.slots.lock();
		let previous = slots.insert(language.into(), Slot::Registered(grammar));
		match previous {
			Some(Slot::Registered(existing)) => {
				slots.insert(language.into(), Slot::Registered(existing));
				false
			}
			Some(Slot::Loading { load, .. }) => {
				load.tx.send_replace(Some(Ok(())));
				debug!(language, load_id = load.id, "grammar.register.superseded_load");
				true
			}
			_ => {
				debug!(language, "grammar.register");
				true
			}
		}
	}

	/// Applies the outcome of load `id`, unless it was superseded.
	fn complete(&self, language: &Arc<str>, id: u64, result: Result<Arc<dyn Grammar>, GrammarError>) {
		let mut slots = self.inner.slots.lock();
		let failures = match slots.get(language) {
			Some(Slot::Loading { failures, load }) if load.id == id => *failures,
			_ => return,
		};

		let (slot, outcome) = match result {
			Ok(grammar) => {
				debug!(language = %language, load_id = id, "grammar.load.registered");
				(Slot::Registered(grammar), Ok(()))
			}
			Err(error) => {
				let failures = failures + 1;
				let retry = self.inner.retry;
				if retry.gives_up(failures) {
					warn!(language = %language, failures, error = %error, "grammar.load.gave_up");
				} else {
					warn!(language = %language, failures, error = %error, retry_in_ms = retry.backoff(failures).as_millis() as u64, "grammar.load.failed");
				}
				let slot = Slot::Unregistered {
					failures,
					retry_at: Some(Instant::now() + retry.backoff(failures)),
				};
				(slot, Err(Arc::new(error)))
			}
		};

		if let Some(Slot::Loading { load, .. }) = slots.insert(language.clone(), slot) {
			load.tx.send_replace(Some(outcome));
		}
	}
}

/// Resolves the load if its task ends without reporting (panic or runtime shutdown).
struct LoadGuard {
	registry: GrammarRegistry,
	language: Arc<str>,
	id: u64,
	done: bool,
}

impl LoadGuard {
	fn finish(&mut self, result: Result<Arc<dyn Grammar>, GrammarError>) {
		self.done = true;
		self.registry.complete(&self.language, self.id, result);
	}
}

impl Drop for LoadGuard {
	fn drop(&mut self) {
		if !self.done {
			let error = GrammarError::Abandoned(self.language.to_string());
			self.registry.complete(&self.language, self.id, Err(error));
		}
	}
}
