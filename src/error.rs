use crate::{connection::ConnectionError, stream::StreamKind};

/// Errors surfaced by engine operations.
///
/// Ordering artifacts of the notification stream (unknown parents, defaults
/// naming entities not yet mirrored) are never errors; they are reconciled
/// silently. Everything here is local to the failing call.
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    /// The connection could not be built or the connect request could not
    /// be dispatched.
    #[error("connection failed: {0}")]
    ConnectionFailed(#[from] ConnectionError),

    /// A connect request failed synchronously before dispatch.
    #[error("connect request was not dispatched")]
    ConnectRejected,

    /// The operation needs an open engine.
    #[error("engine is not open")]
    NotOpen,

    /// No stream of the given kind at the given index.
    #[error("no {kind:?} stream with index {index}")]
    UnknownStream {
        /// Kind namespace that was searched.
        kind: StreamKind,
        /// Index that was not found.
        index: u32,
    },

    /// No stream with the given name in the expected cache.
    #[error("no {kind:?} stream named {name:?}")]
    UnknownName {
        /// Kind namespace that was searched.
        kind: StreamKind,
        /// Name that was not found.
        name: String,
    },

    /// The requested parent is absent from the endpoint cache the client
    /// kind requires, or the kind cannot be reparented at all.
    #[error("invalid parent {target} for {kind:?} stream {index}")]
    InvalidTarget {
        /// Client stream kind being moved.
        kind: StreamKind,
        /// Client stream index.
        index: u32,
        /// Rejected parent index.
        target: u32,
    },

    /// The operation does not apply to streams of this kind.
    #[error("operation not supported for {kind:?} streams")]
    UnsupportedKind {
        /// Offending kind.
        kind: StreamKind,
    },

    /// The stream has no monitor source to attach a level monitor to.
    #[error("no monitor source available for {kind:?} stream {index}")]
    NoMonitor {
        /// Stream kind.
        kind: StreamKind,
        /// Stream index.
        index: u32,
    },

    /// The server rejected the request at dispatch time.
    #[error("request was not dispatched")]
    RequestRejected,
}
