//! Pulsemix - Sound server synchronization engine.
//!
//! Pulsemix keeps a local, queryable mirror of a sound server's object
//! graph: output and input devices, playback and capture endpoints, and
//! per-application client streams. The main features include:
//!
//! - Event-driven reconciliation of server notifications into typed caches
//! - Default endpoint tracking with late name binding
//! - Automatic reconnect supervision after session loss
//! - Control requests for mute, volume, stream moves and monitors
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pulsemix::{Backend, BackendEvent};
//!
//! // Build the engine over a concrete server connection factory.
//! let mut backend = Backend::new(factory);
//! backend.open()?;
//!
//! // Observe changes while the engine runs.
//! let mut events = backend.subscribe();
//! backend.run().await;
//! ```

/// Synchronization engine and its lifecycle states.
pub mod backend;

/// Index-addressed entity caches.
pub mod cache;

/// Server connection seam: traits, states and notifications.
pub mod connection;

/// Mirrored device entities, ports and profiles.
pub mod device;

/// Engine error types.
pub mod error;

/// Change events emitted by the engine.
pub mod events;

/// Mirrored stream entities and their capability model.
pub mod stream;

/// Per-channel volume model.
pub mod volume;

pub use backend::{Backend, BackendState};
pub use error::BackendError;
pub use events::BackendEvent;
