//! Content loading for the haulage engine.
//!
//! Item, machine and flooring definitions plus the [`EngineConfig`] are read
//! from a data directory (RON, JSON or TOML) and resolved into a frozen
//! [`Registry`](haulage_core::registry::Registry).
//!
//! [`EngineConfig`]: haulage_core::config::EngineConfig

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, GameData, load_game_data};
