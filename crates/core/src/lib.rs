//! Core data types for the crypto watcher.

pub mod level;
pub mod snapshot;
pub mod state;

pub use level::*;
pub use snapshot::*;
pub use state::*;
