//! Decides, per change cycle, whether decorations are recomputed or remapped.

use tracing::debug;

/// What the last pass achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassPhase {
	/// No pass has run on the current content yet.
	#[default]
	Clean,
	/// The last pass covered every region whose grammar is available.
	Highlighted,
	/// The last pass was incomplete; grammar loads are in flight.
	AwaitingGrammar,
}

/// The facts about a change cycle the policy looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeSummary {
	pub doc_changed: bool,
	/// The focus was inside a code block before or after the change.
	pub touches_region_type: bool,
	pub external_sync: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeReason {
	ExternalSync,
	RegionEdited,
	FirstPass,
	AwaitingGrammar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
	/// Run the decoration engine.
	Recompute(RecomputeReason),
	/// Map the previous decorations through the change.
	Remap,
}

/// Reconcile state machine.
#[derive(Debug, Clone, Default)]
pub struct ReconcilePolicy {
	phase: PassPhase,
}

impl ReconcilePolicy {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn phase(&self) -> PassPhase {
		self.phase
	}

	pub fn decide(&self, change: ChangeSummary) -> Reconcile {
		let decision = if change.external_sync {
			Reconcile::Recompute(RecomputeReason::ExternalSync)
		} else if change.doc_changed && change.touches_region_type {
			Reconcile::Recompute(RecomputeReason::RegionEdited)
		} else {
			match self.phase {
				PassPhase::Clean => Reconcile::Recompute(RecomputeReason::FirstPass),
				PassPhase::AwaitingGrammar => Reconcile::Recompute(RecomputeReason::AwaitingGrammar),
				PassPhase::Highlighted => Reconcile::Remap,
			}
		};
		debug!(phase = ?self.phase, ?change, ?decision, "highlight.policy.decide");
		decision
	}

	/// Records the outcome of a recompute.
	pub fn record(&mut self, incomplete: bool) {
		self.phase = if incomplete { PassPhase::AwaitingGrammar } else { PassPhase::Highlighted };
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const TYPING_OUTSIDE: ChangeSummary = ChangeSummary {
		doc_changed: true,
		touches_region_type: false,
		external_sync: false,
	};

	fn in_phase(incomplete: Option<bool>) -> ReconcilePolicy {
		let mut policy = ReconcilePolicy::new();
		if let Some(incomplete) = incomplete {
			policy.record(incomplete);
		}
		policy
	}

	#[test]
	fn test_clean_and_awaiting_always_recompute() {
		let idle = ChangeSummary::default();
		assert_eq!(in_phase(None).decide(idle), Reconcile::Recompute(RecomputeReason::FirstPass));
		assert_eq!(in_phase(None).decide(TYPING_OUTSIDE), Reconcile::Recompute(RecomputeReason::FirstPass));
		assert_eq!(in_phase(Some(true)).decide(idle), Reconcile::Recompute(RecomputeReason::AwaitingGrammar));
		assert_eq!(in_phase(Some(true)).phase(), PassPhase::AwaitingGrammar);
	}

	#[test]
	fn test_highlighted_remaps_edits_outside_code() {
		let policy = in_phase(Some(false));
		assert_eq!(policy.phase(), PassPhase::Highlighted);
		assert_eq!(policy.decide(TYPING_OUTSIDE), Reconcile::Remap);
		assert_eq!(policy.decide(ChangeSummary::default()), Reconcile::Remap);
		// Focus in a code block without a content change does not force a pass.
		let selection_only = ChangeSummary {
			touches_region_type: true,
			..Default::default()
		};
		assert_eq!(policy.decide(selection_only), Reconcile::Remap);
	}

	#[test]
	fn test_forcing_conditions_apply_in_every_phase() {
		let region_edit = ChangeSummary {
			touches_region_type: true,
			..TYPING_OUTSIDE
		};
		let sync = ChangeSummary {
			external_sync: true,
			..Default::default()
		};
		for incomplete in [None, Some(false), Some(true)] {
			let policy = in_phase(incomplete);
			assert_eq!(policy.decide(region_edit), Reconcile::Recompute(RecomputeReason::RegionEdited));
			assert_eq!(policy.decide(sync), Reconcile::Recompute(RecomputeReason::ExternalSync));
		}
	}
}
