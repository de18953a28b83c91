//! Typed persistence adapter (`§6` schema contract, `§2` ~15% share).
//!
//! Every row-shaped type in `wcp-domain` is read/written here through plain
//! `sqlx` queries against sqlite. JSON-valued columns (`exits`, `triggers`,
//! `memory`, `likes`, `dislikes`, `interests`, `beliefs`, `damage`,
//! `properties`, `raw_events`) are decoded at this boundary so every other
//! crate works with native Rust types, never raw JSON strings.

pub mod areas;
pub mod characters;
pub mod items;
pub mod migrations;
pub mod narrative;
pub mod pool;
pub mod styles;
pub mod worlds;

pub use pool::connect;
