//! Kernel + Trigger Engine (`§4.1`, `§4.2`, `§2` ~20% + ~15% share).
//!
//! The [`Kernel`] is the sole writer to the persistence adapter for
//! mutating operations. Every exposed mutator runs inside one sqlite
//! transaction and leaves every `§3`/`§8` invariant true on success, or is a
//! no-op on failure. Mutators that change area/world state after commit
//! hand their event to the [`triggers::TriggerEngine`], which is a plain
//! synchronous call — no external broker, per `§9`.

pub mod kernel;
pub mod triggers;

pub use kernel::Kernel;
pub use triggers::TriggerEngine;
