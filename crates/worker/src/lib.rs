//! Worker runtime primitives for the highlighter.
//!
//! Highlighting itself runs synchronously inside the host's change loop. The only
//! asynchronous work is grammar loading and the passes it (or first mount) schedules,
//! and that work must never touch a surface that is gone. This crate provides the
//! spawning entry points, the [`SurfaceLifetime`] cancellation handle, and helpers
//! that bind a task to a lifetime.

mod class;
mod deferred;
mod lifetime;
mod panic;
mod spawn;

pub use class::TaskClass;
pub use deferred::{Bound, spawn_bound, spawn_deferred};
pub use lifetime::SurfaceLifetime;
pub use panic::{join_error_panic_message, panic_payload_message};
pub use spawn::{spawn, spawn_blocking};

#[cfg(test)]
mod tests;
