//! The pass object a document host drives.

use codefence_language::GrammarRegistry;
use codefence_primitives::{DecorationSet, DocumentTree};
use tracing::{debug, warn};

use crate::HighlightConfig;
use crate::change::Change;
use crate::engine::{DecorationEngine, PassStats};
use crate::policy::{ChangeSummary, PassPhase, Reconcile, ReconcilePolicy};
use crate::scan::BlockScanner;
use crate::scheduler::{DeferredScheduler, Surface};

/// Decoration state stored by the host between change cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightState {
	decorations: DecorationSet,
}

impl HighlightState {
	pub fn decorations(&self) -> &DecorationSet {
		&self.decorations
	}
}

/// Syntax highlighting for the code blocks of one document.
///
/// The host calls [`HighlightPass::init`] once, [`HighlightPass::apply`] for every
/// change cycle, and renders [`HighlightPass::decorations_for`]. Mounting an editing
/// surface enables the deferred first pass and follow-up passes after grammar loads.
#[derive(Debug)]
pub struct HighlightPass {
	engine: DecorationEngine,
	policy: ReconcilePolicy,
	scheduler: DeferredScheduler,
	last_stats: Option<PassStats>,
}

impl HighlightPass {
	/// Creates a pass over `registry`, usually [`HighlightConfig::registry`] shared
	/// between documents.
	pub fn new(registry: GrammarRegistry, config: &HighlightConfig) -> Self {
		if registry.retry_policy() != config.retry_policy() {
			warn!(registry = ?registry.retry_policy(), config = ?config.retry_policy(), "highlight.retry_policy_mismatch");
		}
		let scanner = BlockScanner::new(&config.code_block_type);
		Self {
			engine: DecorationEngine::new(registry, scanner, config.limits()),
			policy: ReconcilePolicy::new(),
			scheduler: DeferredScheduler::new(config.defer_delay()),
			last_stats: None,
		}
	}

	/// Initial state: no decorations until the first pass.
	pub fn init<D: DocumentTree>(&mut self, _doc: &D) -> HighlightState {
		HighlightState::default()
	}

	/// Computes the state after `change`.
	pub fn apply<D: DocumentTree>(&mut self, change: &Change<'_, D>, previous: &HighlightState) -> HighlightState {
		let scanner = self.engine.scanner();
		let summary = ChangeSummary {
			doc_changed: change.doc_changed,
			touches_region_type: scanner.is_region_type(change.focus_before) || scanner.is_region_type(change.focus_after),
			external_sync: change.external_sync,
		};

		match self.policy.decide(summary) {
			Reconcile::Recompute(reason) => {
				let pass = self.engine.recompute(change.doc);
				debug!(?reason, meta = ?change.meta, incomplete = pass.incomplete, "highlight.recompute");
				self.policy.record(pass.incomplete);
				self.last_stats = Some(pass.stats);
				if pass.incomplete {
					self.scheduler.follow_up(pass.pending);
				}
				HighlightState {
					decorations: pass.decorations,
				}
			}
			Reconcile::Remap => HighlightState {
				decorations: match change.mapping {
					Some(mapping) => previous.decorations.map(mapping),
					None => previous.decorations.clone(),
				},
			},
		}
	}

	/// Decorations to render for `state`.
	pub fn decorations_for<'s>(&self, state: &'s HighlightState) -> &'s DecorationSet {
		&state.decorations
	}

	/// Attaches an editing surface.
	///
	/// Unless the last pass covered everything, schedules the deferred pass.
	pub fn mount(&mut self, surface: Surface) {
		self.scheduler.attach(surface);
		if self.policy.phase() != PassPhase::Highlighted {
			self.scheduler.schedule_deferred_pass();
		}
	}

	/// Tears the surface down. Pending deferred and follow-up passes are dropped.
	pub fn unmount(&mut self) {
		self.scheduler.detach();
	}

	pub fn phase(&self) -> PassPhase {
		self.policy.phase()
	}

	/// Statistics of the last recompute.
	pub fn last_stats(&self) -> Option<PassStats> {
		self.last_stats
	}

	pub fn engine(&self) -> &DecorationEngine {
		&self.engine
	}
}
