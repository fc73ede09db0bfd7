#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use codefence_language::{BuiltinLoader, Grammar, GrammarError, GrammarLoader, GrammarRegistry, RetryPolicy, builtin_grammar};
use codefence_primitives::{ChangeSet, CharIdx, Document};
use codefence_syntax::{Change, HighlightConfig, HighlightPass, HighlightState, PassMeta, Surface};
use codefence_worker::SurfaceLifetime;
use tokio::sync::{mpsc, watch};

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::DEBUG).try_init();
}

struct LoaderState {
	calls: AtomicUsize,
	failures_left: AtomicUsize,
	gate: watch::Sender<bool>,
	/// Gates that hold one language back independently of `gate`.
	language_gates: Vec<(String, watch::Sender<bool>)>,
}

/// Built-in grammars behind a gate, with scripted failures.
#[derive(Clone)]
pub struct ScriptedLoader {
	state: Arc<LoaderState>,
}

impl ScriptedLoader {
	pub fn open() -> Self {
		Self::new(true, 0)
	}

	pub fn gated() -> Self {
		Self::new(false, 0)
	}

	pub fn failing(times: usize) -> Self {
		Self::new(true, times)
	}

	/// Holds each of `languages` back until released on its own.
	pub fn gated_per_language(languages: &[&str]) -> Self {
		Self::with_gates(true, 0, languages)
	}

	fn new(open: bool, failures: usize) -> Self {
		Self::with_gates(open, failures, &[])
	}

	fn with_gates(open: bool, failures: usize, languages: &[&str]) -> Self {
		Self {
			state: Arc::new(LoaderState {
				calls: AtomicUsize::new(0),
				failures_left: AtomicUsize::new(failures),
				gate: watch::Sender::new(open),
				language_gates: languages.iter().map(|language| (language.to_string(), watch::Sender::new(false))).collect(),
			}),
		}
	}

	/// Lets every waiting and future load proceed.
	pub fn release(&self) {
		self.state.gate.send_replace(true);
		for (_, gate) in &self.state.language_gates {
			gate.send_replace(true);
		}
	}

	/// Lets loads of `language` proceed.
	pub fn release_language(&self, language: &str) {
		if let Some((_, gate)) = self.state.language_gates.iter().find(|(tag, _)| tag == language) {
			gate.send_replace(true);
		}
	}

	pub fn calls(&self) -> usize {
		self.state.calls.load(Ordering::SeqCst)
	}

	pub fn registry(&self) -> GrammarRegistry {
		GrammarRegistry::builder().loader(self.clone()).retry(RetryPolicy::default()).build()
	}
}

#[async_trait]
impl GrammarLoader for ScriptedLoader {
	fn provides(&self, language: &str) -> bool {
		BuiltinLoader.provides(language)
	}

	async fn load(&self, language: &str) -> Result<Arc<dyn Grammar>, GrammarError> {
		self.state.calls.fetch_add(1, Ordering::SeqCst);
		let gate = match self.state.language_gates.iter().find(|(tag, _)| tag == language) {
			Some((_, gate)) => gate,
			None => &self.state.gate,
		};
		let mut gate = gate.subscribe();
		let _ = gate.wait_for(|open| *open).await;
		if self
			.state
			.failures_left
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
			.is_ok()
		{
			return Err(GrammarError::LoadFailed {
				language: language.to_string(),
				reason: "fetch failed".to_string(),
			});
		}
		BuiltinLoader.load(language).await
	}
}

/// Registry with the given grammars registered up front.
pub fn preloaded(tags: &[&str]) -> GrammarRegistry {
	let registry = GrammarRegistry::default();
	for tag in tags {
		registry.register(tag, Arc::new(builtin_grammar(tag).unwrap().unwrap()));
	}
	registry
}

/// Minimal document host: owns the snapshot and the stored highlight state, and
/// turns dispatched metadata into change cycles.
pub struct Host {
	pub pass: HighlightPass,
	pub doc: Document,
	pub state: HighlightState,
	tx: mpsc::UnboundedSender<PassMeta>,
	rx: mpsc::UnboundedReceiver<PassMeta>,
	pub lifetime: SurfaceLifetime,
}

impl Host {
	pub fn new(registry: GrammarRegistry, doc: Document) -> Self {
		init_tracing();
		let mut pass = HighlightPass::new(registry, &HighlightConfig::default());
		let state = pass.init(&doc);
		let (tx, rx) = mpsc::unbounded_channel();
		Self {
			pass,
			doc,
			state,
			tx,
			rx,
			lifetime: SurfaceLifetime::new(),
		}
	}

	/// Mounts a fresh surface; `lifetime` tracks the latest one.
	pub fn mount(&mut self) {
		self.lifetime = SurfaceLifetime::new();
		self.pass.mount(Surface::new(self.tx.clone(), self.lifetime.clone()));
	}

	/// Waits for the next dispatched cycle, giving up after `timeout`.
	pub async fn next_meta(&mut self, timeout: Duration) -> Option<PassMeta> {
		tokio::time::timeout(timeout, self.rx.recv()).await.ok().flatten()
	}

	/// Runs a highlighter-requested cycle.
	pub fn deliver(&mut self, meta: PassMeta) {
		let change = Change::meta(&self.doc, meta);
		self.state = self.pass.apply(&change, &self.state);
	}

	/// Waits for the next dispatched cycle and runs it.
	pub async fn pump(&mut self) -> PassMeta {
		let meta = self.next_meta(Duration::from_secs(60)).await.expect("no pass was dispatched");
		self.deliver(meta);
		meta
	}

	/// Applies a local edit, with the focus at `focus` before and after.
	pub fn edit(&mut self, focus: CharIdx, edited: (Document, ChangeSet)) {
		self.apply_edit(focus, edited, false);
	}

	/// Applies an edit that arrived through collaborative sync.
	pub fn sync(&mut self, focus: CharIdx, edited: (Document, ChangeSet)) {
		self.apply_edit(focus, edited, true);
	}

	fn apply_edit(&mut self, focus: CharIdx, (doc, changes): (Document, ChangeSet), external: bool) {
		let before = self.doc.node_type_at(focus).map(str::to_owned);
		let after = doc.node_type_at(focus).map(str::to_owned);
		let mut change = Change::edit(&doc, &changes).with_focus(before.as_deref(), after.as_deref());
		if external {
			change = change.external();
		}
		self.state = self.pass.apply(&change, &self.state);
		self.doc = doc;
	}

	pub fn spans(&self) -> Vec<(usize, usize, String)> {
		self.pass.decorations_for(&self.state).iter().map(|d| (d.from, d.to, d.class())).collect()
	}
}

pub fn owned(items: &[(usize, usize, &str)]) -> Vec<(usize, usize, String)> {
	items.iter().map(|(from, to, class)| (*from, *to, class.to_string())).collect()
}
