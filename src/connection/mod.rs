/// Typed notifications emitted by a connection.
pub mod notification;

use tokio::sync::mpsc;

use crate::{stream::StreamKind, volume::Volume};

pub use notification::Notification;

/// Receiving half of a connection's notification channel.
pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

/// Lifecycle of the session to the audio server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session, either never opened or lost.
    Disconnected,
    /// Transport-level connection in progress.
    Connecting,
    /// Authenticating with the server.
    Authorizing,
    /// Downloading the initial object lists.
    Loading,
    /// Handshake complete, notifications flowing.
    Connected,
}

/// Application identity handed to the server on connect.
#[derive(Debug, Clone, Default)]
pub struct AppDetails {
    /// Application name shown in server-side client lists.
    pub name: Option<String>,
    /// Application identifier.
    pub id: Option<String>,
    /// Application version string.
    pub version: Option<String>,
    /// Application icon name.
    pub icon: Option<String>,
    /// Explicit server address; `None` picks the environment default.
    pub server_address: Option<String>,
}

/// Failure to build a connection.
///
/// Construction makes no connect attempt; it only sets up the transport
/// structures, which can still fail.
#[derive(thiserror::Error, Debug)]
pub enum ConnectionError {
    /// The transport structures could not be set up.
    #[error("connection setup failed: {0}")]
    Setup(String),
}

/// Session to the audio server, specified at its interface only.
///
/// Implementations own the protocol machinery and deliver [`Notification`]s
/// through the channel handed out at construction. Every request here is
/// non-blocking: the returned `bool` says whether the request was
/// dispatched, never whether it succeeded. Outcomes arrive later as
/// notifications.
pub trait Connection: Send + 'static {
    /// Current lifecycle state.
    fn state(&self) -> ConnectionState;

    /// Start a connection attempt. Returns whether the attempt was
    /// dispatched; progress is reported via `StateChanged` notifications.
    fn connect(&mut self) -> bool;

    /// Tear the session down.
    fn disconnect(&mut self);

    /// Ask the server to make the named sink the default playback endpoint.
    fn set_default_sink(&mut self, name: &str) -> bool;

    /// Ask the server to make the named source the default capture endpoint.
    fn set_default_source(&mut self, name: &str) -> bool;

    /// Change the mute flag of the indexed stream.
    fn set_mute(&mut self, kind: StreamKind, index: u32, mute: bool) -> bool;

    /// Change the volume of the indexed stream.
    fn set_volume(&mut self, kind: StreamKind, index: u32, volume: &Volume) -> bool;

    /// Move a client stream under a new parent endpoint.
    fn move_stream(&mut self, kind: StreamKind, index: u32, target: u32) -> bool;

    /// Kill a client stream.
    fn terminate(&mut self, kind: StreamKind, index: u32) -> bool;

    /// Create a level monitor fed from the given monitor source, scoped to
    /// one client stream when `stream_index` is set.
    fn create_monitor(&mut self, source_index: u32, stream_index: Option<u32>) -> bool;
}

/// Builder for [`Connection`]s, the seam the engine is generic over.
pub trait ConnectionFactory: Send + 'static {
    /// Concrete connection type produced by this factory.
    type Connection: Connection;

    /// Set up a connection and its notification channel.
    ///
    /// No connect attempt is made here.
    ///
    /// # Errors
    /// Returns an error when the transport structures cannot be built.
    fn establish(
        &mut self,
        details: &AppDetails,
    ) -> Result<(Self::Connection, NotificationReceiver), ConnectionError>;
}
