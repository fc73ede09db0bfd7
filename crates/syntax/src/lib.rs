//! Incremental syntax highlighting for code blocks embedded in a rich-text document.
//!
//! A [`HighlightPass`] sits in the host's change loop. For every change cycle the
//! [`ReconcilePolicy`] decides whether the previous decorations can be remapped or
//! must be recomputed; the [`DecorationEngine`] recomputes with a per-region
//! [`TokenCache`] and the shared [`GrammarRegistry`](codefence_language::GrammarRegistry),
//! and the [`DeferredScheduler`] runs the deferred first pass and the follow-up pass
//! once missing grammars have loaded.

mod cache;
mod change;
mod config;
mod engine;
mod pass;
mod policy;
mod scan;
mod scheduler;

pub use cache::TokenCache;
pub use change::{Change, Dispatch, PassMeta};
pub use config::{ConfigError, GrammarConfig, HighlightConfig};
pub use engine::{DecorationEngine, PassStats, RenderPass};
pub use pass::{HighlightPass, HighlightState};
pub use policy::{ChangeSummary, PassPhase, Reconcile, ReconcilePolicy, RecomputeReason};
pub use scan::{BlockScanner, Region};
pub use scheduler::{DeferredScheduler, Surface};
