//! # Scenario Model
//!
//! The passive half of the scenario interpreter: the world configuration as
//! authored in JSON, the world description it materialises into, and the
//! player state of one play session. This crate holds data and lookups only;
//! every behaviour lives in `scenario_engine`.

pub mod definitions;
pub mod error;
pub mod world_state;

pub use definitions::*;
pub use error::*;
pub use world_state::*;
