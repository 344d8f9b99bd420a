//! # Scenario Engine
//!
//! The behaviour half of the scenario interpreter. This crate owns the
//! [`scenario_model::WorldModel`] of one play session and drives the host
//! (renderer, asset loader, audio, widgets, clock) through narrow traits.
//!
//! ## Core Components
//!
//! - **guards**: Pure predicates over the player state
//! - **dispatcher**: Runs action lists, messages included
//! - **loader**: Stage preloading and materialisation
//! - **puzzle**: Code submission and hints
//! - **scenes**: Scene transitions and object visibility
//! - **events**: Inbound events for the interpreter's queue
//! - **host**: Collaborator traits and a recording host for tests
//!
//! ## Design Philosophy
//!
//! - **Single Owner**: Only the interpreter mutates the world model
//! - **Event-Driven**: Timers and asset batches come back as queued events, never as callbacks
//! - **Fail Loudly**: Authoring errors surface to the caller of the entry point that hit them

mod dispatcher;
pub mod events;
pub mod guards;
pub mod host;
pub mod interpreter;
mod loader;
mod puzzle;
mod scenes;

pub use events::*;
pub use guards::*;
pub use host::*;
pub use interpreter::*;
