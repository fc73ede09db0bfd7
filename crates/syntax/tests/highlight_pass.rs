//! End-to-end change cycles through [`HighlightPass`] with a simulated host.

mod common;

use std::time::Duration;

use codefence_language::GrammarStatus;
use codefence_primitives::{Block, Document, NodeId};
use codefence_syntax::{HighlightConfig, HighlightPass, PassMeta, PassPhase};
use common::{Host, ScriptedLoader, owned, preloaded};
use pretty_assertions::assert_eq;

const QUIET: Duration = Duration::from_secs(5);

fn python_doc() -> Document {
	Document::new(vec![Block::paragraph(NodeId(1), "hello"), Block::code(NodeId(2), "python", "x = 1")])
}

#[tokio::test(start_paused = true)]
async fn test_registered_grammar_highlights_on_deferred_pass() {
	let mut host = Host::new(preloaded(&["python"]), python_doc());
	assert!(host.spans().is_empty());

	host.mount();
	assert_eq!(host.pump().await, PassMeta::DeferredPass);
	assert_eq!(host.spans(), owned(&[(8, 9, "identifier"), (10, 11, "operator"), (12, 13, "number")]));
	assert_eq!(host.pass.phase(), PassPhase::Highlighted);

	// Complete pass: no follow-up.
	assert_eq!(host.next_meta(QUIET).await, None);
}

#[tokio::test(start_paused = true)]
async fn test_missing_grammar_loads_and_follow_up_highlights() {
	let loader = ScriptedLoader::gated();
	let registry = loader.registry();
	let doc = Document::new(vec![Block::code(NodeId(1), "rust", "fn main() {}")]);
	let mut host = Host::new(registry.clone(), doc);

	host.mount();
	assert_eq!(host.pump().await, PassMeta::DeferredPass);
	assert!(host.spans().is_empty());
	assert_eq!(host.pass.phase(), PassPhase::AwaitingGrammar);
	assert_eq!(registry.status("rust"), GrammarStatus::Loading);
	assert_eq!(host.pass.last_stats().unwrap().awaiting, 1);

	loader.release();
	assert_eq!(host.pump().await, PassMeta::GrammarLoaded);
	assert!(registry.is_ready("rust"));
	assert_eq!(host.pass.phase(), PassPhase::Highlighted);
	let spans = host.spans();
	assert!(spans.contains(&(1, 3, "keyword".to_string())), "{spans:?}");
	assert!(spans.contains(&(4, 8, "function".to_string())), "{spans:?}");
	assert_eq!(loader.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_edit_outside_code_remaps_without_recompute() {
	let mut host = Host::new(preloaded(&["python"]), python_doc());
	host.mount();
	host.pump().await;
	let stats = host.pass.last_stats();

	let edited = host.doc.insert_text(1, "XY").unwrap();
	host.edit(1, edited);

	assert_eq!(host.spans(), owned(&[(10, 11, "identifier"), (12, 13, "operator"), (14, 15, "number")]));
	assert_eq!(host.pass.last_stats(), stats);
	assert_eq!(host.pass.phase(), PassPhase::Highlighted);
}

#[tokio::test(start_paused = true)]
async fn test_language_switch_recomputes_region() {
	let doc = Document::new(vec![Block::paragraph(NodeId(1), "hello"), Block::code(NodeId(2), "python", "let x = 1")]);
	let mut host = Host::new(preloaded(&["python", "rust"]), doc);
	host.mount();
	host.pump().await;
	assert!(host.spans().contains(&(8, 11, "identifier".to_string())));

	let edited = host.doc.set_language(NodeId(2), Some("rust")).unwrap();
	host.edit(8, edited);

	let spans = host.spans();
	assert!(spans.contains(&(8, 11, "keyword".to_string())), "{spans:?}");
	let stats = host.pass.last_stats().unwrap();
	assert_eq!(stats.tokenized, 1);
	assert_eq!(stats.cache_hits, 0);
}

#[tokio::test(start_paused = true)]
async fn test_code_edit_retokenizes_only_the_edited_region() {
	let doc = Document::new(vec![
		Block::code(NodeId(1), "python", "x = 1"),
		Block::paragraph(NodeId(2), "between"),
		Block::code(NodeId(3), "json", "[1]"),
	]);
	let mut host = Host::new(preloaded(&["python", "json"]), doc);
	host.mount();
	host.pump().await;

	// "x = 1" -> "x = 12"
	let edited = host.doc.insert_text(6, "2").unwrap();
	host.edit(6, edited);

	let stats = host.pass.last_stats().unwrap();
	assert_eq!(stats.tokenized, 1);
	assert_eq!(stats.cache_hits, 1);
	let spans = host.spans();
	assert!(spans.contains(&(5, 7, "number".to_string())), "{spans:?}");
	// The json block moved by one.
	assert!(spans.contains(&(18, 19, "punctuation".to_string())), "{spans:?}");
	assert!(spans.contains(&(19, 20, "number".to_string())), "{spans:?}");
}

#[tokio::test(start_paused = true)]
async fn test_external_sync_recomputes_even_outside_code() {
	let mut host = Host::new(preloaded(&["python"]), python_doc());
	host.mount();
	host.pump().await;

	let edited = host.doc.insert_text(1, "XY").unwrap();
	host.sync(1, edited);

	let stats = host.pass.last_stats().unwrap();
	assert_eq!(stats.cache_hits, 1);
	assert_eq!(host.spans(), owned(&[(10, 11, "identifier"), (12, 13, "operator"), (14, 15, "number")]));
}

#[tokio::test(start_paused = true)]
async fn test_removed_block_is_pruned_from_cache() {
	let doc = Document::new(vec![Block::code(NodeId(1), "python", "x = 1"), Block::code(NodeId(2), "python", "y = 2")]);
	let mut host = Host::new(preloaded(&["python"]), doc);
	host.mount();
	host.pump().await;
	assert_eq!(host.pass.engine().cache().len(), 2);

	let edited = host.doc.remove_block(NodeId(1)).unwrap();
	host.edit(1, edited);

	assert_eq!(host.pass.engine().cache().len(), 1);
	assert!(host.pass.engine().cache().contains(NodeId(2)));
	assert_eq!(host.spans(), owned(&[(1, 2, "identifier"), (3, 4, "operator"), (5, 6, "number")]));
}

#[tokio::test(start_paused = true)]
async fn test_regions_sharing_a_load_get_one_follow_up() {
	let loader = ScriptedLoader::gated();
	let doc = Document::new(vec![Block::code(NodeId(1), "rust", "let a = 1;"), Block::code(NodeId(2), "rust", "let b = 2;")]);
	let mut host = Host::new(loader.registry(), doc);
	host.mount();
	assert_eq!(host.pump().await, PassMeta::DeferredPass);

	// A second incomplete pass while the load is still running joins the batch.
	let edited = host.doc.insert_text(10, " ").unwrap();
	host.edit(10, edited);
	assert_eq!(host.pass.phase(), PassPhase::AwaitingGrammar);

	loader.release();
	assert_eq!(host.pump().await, PassMeta::GrammarLoaded);
	assert_eq!(host.next_meta(QUIET).await, None);
	assert_eq!(loader.calls(), 1);
	assert_eq!(host.pass.last_stats().unwrap().tokenized, 2);
}

#[tokio::test(start_paused = true)]
async fn test_load_added_by_later_pass_joins_pending_follow_up() {
	let loader = ScriptedLoader::gated_per_language(&["rust", "python"]);
	let doc = Document::new(vec![Block::code(NodeId(1), "rust", "fn f() {}")]);
	let mut host = Host::new(loader.registry(), doc);
	host.mount();
	assert_eq!(host.pump().await, PassMeta::DeferredPass);

	// A python block arrives while rust is still loading.
	let edited = host.doc.insert_block(1, Block::code(NodeId(2), "python", "x = 1"));
	host.edit(12, edited);
	assert_eq!(host.pass.phase(), PassPhase::AwaitingGrammar);
	assert_eq!(host.pass.last_stats().unwrap().awaiting, 2);

	loader.release_language("rust");
	assert_eq!(host.next_meta(QUIET).await, None);

	loader.release_language("python");
	assert_eq!(host.pump().await, PassMeta::GrammarLoaded);
	assert_eq!(host.next_meta(QUIET).await, None);
	assert_eq!(host.pass.phase(), PassPhase::Highlighted);
	assert_eq!(host.pass.last_stats().unwrap().tokenized, 2);
	assert!(host.spans().contains(&(12, 13, "identifier".to_string())));
	assert_eq!(loader.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_remount_keeps_a_single_follow_up() {
	let loader = ScriptedLoader::gated();
	let doc = Document::new(vec![Block::code(NodeId(1), "rust", "fn f() {}")]);
	let mut host = Host::new(loader.registry(), doc);
	host.mount();
	assert_eq!(host.pump().await, PassMeta::DeferredPass);
	let first = host.lifetime.clone();

	host.mount();
	assert!(first.is_torn_down());
	assert_eq!(host.pump().await, PassMeta::DeferredPass);

	loader.release();
	assert_eq!(host.pump().await, PassMeta::GrammarLoaded);
	assert_eq!(host.next_meta(QUIET).await, None);
	assert_eq!(host.pass.phase(), PassPhase::Highlighted);
}

#[test]
fn test_configured_retry_policy_reaches_the_engine() {
	let config = HighlightConfig::from_toml_str("[grammar]\nmax_attempts = 1").unwrap();
	let pass = HighlightPass::new(config.registry(), &config);
	assert_eq!(pass.engine().registry().retry_policy().max_attempts, 1);
}

#[tokio::test(start_paused = true)]
async fn test_unmount_drops_follow_up() {
	let loader = ScriptedLoader::gated();
	let registry = loader.registry();
	let doc = Document::new(vec![Block::code(NodeId(1), "rust", "fn f() {}")]);
	let mut host = Host::new(registry.clone(), doc);
	host.mount();
	host.pump().await;
	let load = registry.ensure_loaded("rust").expect("load in flight");

	host.pass.unmount();
	assert!(host.lifetime.is_torn_down());
	loader.release();
	assert!(load.finished().await.is_ok());

	// The grammar is registered but nobody is told.
	assert!(registry.is_ready("rust"));
	assert_eq!(host.next_meta(QUIET).await, None);
	assert!(host.spans().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_load_is_retried_by_follow_up_passes() {
	let loader = ScriptedLoader::failing(1);
	let registry = loader.registry();
	let doc = Document::new(vec![Block::code(NodeId(1), "python", "x = 1")]);
	let mut host = Host::new(registry.clone(), doc);
	host.mount();
	assert_eq!(host.pump().await, PassMeta::DeferredPass);

	// The first load fails; the follow-up pass starts the retry.
	assert_eq!(host.pump().await, PassMeta::GrammarLoaded);
	assert_eq!(host.pass.phase(), PassPhase::AwaitingGrammar);
	assert!(host.spans().is_empty());

	assert_eq!(host.pump().await, PassMeta::GrammarLoaded);
	assert_eq!(host.pass.phase(), PassPhase::Highlighted);
	assert_eq!(host.spans(), owned(&[(1, 2, "identifier"), (3, 4, "operator"), (5, 6, "number")]));
	assert_eq!(loader.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_settle_as_plain() {
	let loader = ScriptedLoader::failing(usize::MAX);
	let registry = loader.registry();
	let doc = Document::new(vec![Block::code(NodeId(1), "python", "x = 1")]);
	let mut host = Host::new(registry.clone(), doc);
	host.mount();
	host.pump().await;

	let attempts = registry.retry_policy().max_attempts;
	for _ in 0..attempts {
		assert_eq!(host.pump().await, PassMeta::GrammarLoaded);
	}
	assert_eq!(registry.status("python"), GrammarStatus::GaveUp { failures: attempts });
	assert_eq!(host.pass.phase(), PassPhase::Highlighted);
	assert!(host.spans().is_empty());
	assert_eq!(host.next_meta(QUIET).await, None);
	assert_eq!(loader.calls(), attempts as usize);
}

#[tokio::test(start_paused = true)]
async fn test_mount_after_highlighted_schedules_nothing() {
	let mut host = Host::new(preloaded(&["python"]), python_doc());
	host.deliver(PassMeta::DeferredPass);
	assert_eq!(host.pass.phase(), PassPhase::Highlighted);

	host.mount();
	assert_eq!(host.next_meta(QUIET).await, None);
}

#[tokio::test(start_paused = true)]
async fn test_incomplete_pass_before_mount_is_picked_up_on_mount() {
	let loader = ScriptedLoader::open();
	let doc = Document::new(vec![Block::code(NodeId(1), "go", "package main")]);
	let mut host = Host::new(loader.registry(), doc);

	// No surface yet: the pass is incomplete and nothing follows up.
	host.deliver(PassMeta::DeferredPass);
	assert_eq!(host.pass.phase(), PassPhase::AwaitingGrammar);
	assert_eq!(host.next_meta(QUIET).await, None);

	host.mount();
	assert_eq!(host.pump().await, PassMeta::DeferredPass);
	assert_eq!(host.pass.phase(), PassPhase::Highlighted);
	assert!(host.spans().contains(&(1, 8, "keyword".to_string())));
}
