//! The recompute algorithm.
//!
//! One pass scans the snapshot, reuses cached decorations where the fingerprint
//! still matches, tokenizes the rest with registered grammars, and requests loads
//! for grammars that are known but not yet available. The pass never touches the
//! document and runs synchronously; loads it requests complete in the background.

use std::panic::{AssertUnwindSafe, catch_unwind};

use codefence_language::{Grammar, GrammarLoad, GrammarRegistry, TokenizeLimits, is_plain, tokenize};
use codefence_primitives::{Decoration, DecorationSet, DocumentTree};
use codefence_worker::panic_payload_message;
use tracing::{debug, warn};

use crate::cache::TokenCache;
use crate::scan::{BlockScanner, Region};

/// Counters of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassStats {
	/// Code regions found by the scan.
	pub regions: usize,
	/// Regions served from the cache.
	pub cache_hits: usize,
	/// Regions tokenized in this pass.
	pub tokenized: usize,
	/// Regions left undecorated: plain, unknown language, or given up.
	pub plain: usize,
	/// Regions waiting for a grammar load.
	pub awaiting: usize,
	/// Regions whose tokenization failed and degraded to no decorations.
	pub failed: usize,
}

/// Result of one recompute.
#[derive(Debug)]
pub struct RenderPass {
	pub decorations: DecorationSet,
	/// Some region's grammar is known but not registered yet.
	pub incomplete: bool,
	/// Loads to await before the follow-up pass, one handle per load.
	pub pending: Vec<GrammarLoad>,
	pub stats: PassStats,
}

/// Owns the region cache of one document and computes its decorations.
#[derive(Debug)]
pub struct DecorationEngine {
	registry: GrammarRegistry,
	scanner: BlockScanner,
	cache: TokenCache,
	limits: TokenizeLimits,
}

impl DecorationEngine {
	pub fn new(registry: GrammarRegistry, scanner: BlockScanner, limits: TokenizeLimits) -> Self {
		Self {
			registry,
			scanner,
			cache: TokenCache::new(),
			limits,
		}
	}

	pub fn registry(&self) -> &GrammarRegistry {
		&self.registry
	}

	pub fn scanner(&self) -> &BlockScanner {
		&self.scanner
	}

	pub fn cache(&self) -> &TokenCache {
		&self.cache
	}

	/// Computes the decorations of every code region in `doc`.
	pub fn recompute<D: DocumentTree>(&mut self, doc: &D) -> RenderPass {
		let regions = self.scanner.scan(doc);
		let mut stats = PassStats {
			regions: regions.len(),
			..Default::default()
		};
		let mut decorations = Vec::new();
		let mut pending: Vec<GrammarLoad> = Vec::new();
		let mut incomplete = false;

		for region in &regions {
			let Some(language) = region.language.filter(|tag| !is_plain(Some(*tag))) else {
				stats.plain += 1;
				continue;
			};

			let grammar = match self.registry.grammar(language) {
				Some(grammar) => grammar,
				None => match self.registry.ensure_loaded(language) {
					Some(load) => {
						if !pending.iter().any(|p| p.id() == load.id()) {
							pending.push(load);
						}
						incomplete = true;
						stats.awaiting += 1;
						continue;
					}
					// Registered by another surface in the meantime, or never loadable.
					None => match self.registry.grammar(language) {
						Some(grammar) => grammar,
						None => {
							stats.plain += 1;
							continue;
						}
					},
				},
			};

			if let Some(cached) = self.cache.get(region) {
				stats.cache_hits += 1;
				decorations.extend_from_slice(cached);
				continue;
			}

			let computed = match highlight_region(region, &*grammar, &self.limits) {
				Ok(computed) => computed,
				Err(reason) => {
					warn!(language, region = ?region.id, %reason, "highlight.region.degraded");
					stats.failed += 1;
					Vec::new()
				}
			};
			stats.tokenized += 1;
			decorations.extend_from_slice(&computed);
			self.cache.put(region, computed);
		}

		let pruned = self.cache.prune(&regions);
		debug!(
			regions = stats.regions,
			cache_hits = stats.cache_hits,
			tokenized = stats.tokenized,
			plain = stats.plain,
			awaiting = stats.awaiting,
			failed = stats.failed,
			pruned,
			incomplete,
			"highlight.pass"
		);

		RenderPass {
			decorations: DecorationSet::new(decorations),
			incomplete,
			pending,
			stats,
		}
	}
}

/// Tokenizes one region into absolute decorations.
///
/// Tokenizer errors and panics are reported as a message; the caller degrades the
/// region to plain text.
fn highlight_region(region: &Region<'_>, grammar: &dyn Grammar, limits: &TokenizeLimits) -> Result<Vec<Decoration>, String> {
	let tokens = match catch_unwind(AssertUnwindSafe(|| tokenize(region.text, grammar, limits))) {
		Ok(Ok(tokens)) => tokens,
		Ok(Err(err)) => return Err(err.to_string()),
		Err(payload) => return Err(panic_payload_message(&*payload).unwrap_or_else(|| "tokenizer panicked".to_string())),
	};
	Ok(tokens
		.into_iter()
		.filter(|token| !token.labels.is_empty())
		.map(|token| Decoration::new(region.content_start + token.start, region.content_start + token.end, token.labels))
		.collect())
}
