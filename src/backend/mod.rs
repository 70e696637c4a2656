/// Default-slot resolution.
mod defaults;
/// Notification reconciliation.
mod reconcile;
/// Connection-loss supervision.
mod reconnect;


use std::pin::Pin;

use async_stream::stream;
use futures::Stream as FuturesStream;
use tokio::sync::{broadcast, mpsc::error::TryRecvError};
use tracing::warn;

use crate::{
    cache::EntityCache,
    connection::{AppDetails, Connection, ConnectionFactory, Notification, NotificationReceiver},
    device::Device,
    error::BackendError,
    events::BackendEvent,
    stream::{Sink, SinkInput, Source, SourceOutput, Stream, StreamKind},
    volume::Volume,
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Engine lifecycle, exposed to the consuming façade as one observable
/// property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    /// Not open.
    Idle,
    /// Session being established (covers transport connect, authorization
    /// and the initial object-list download).
    Connecting,
    /// Handshake complete, mirror live.
    Ready,
    /// No further automatic recovery is possible for this session.
    Failed,
}

/// Synchronization engine mirroring the server's object graph.
///
/// Owns the five entity caches, the default slots and the reconnect
/// supervisor. All mutation happens on the caller's task through
/// [`handle_notification`](Backend::handle_notification), normally driven by
/// [`run`](Backend::run); the caches therefore need no locks.
pub struct Backend<F: ConnectionFactory> {
    factory: F,
    details: AppDetails,
    connection: Option<F::Connection>,
    notifications: Option<NotificationReceiver>,

    pub(crate) devices: EntityCache<Device>,
    pub(crate) sinks: EntityCache<Sink>,
    pub(crate) sink_inputs: EntityCache<SinkInput>,
    pub(crate) sources: EntityCache<Source>,
    pub(crate) source_outputs: EntityCache<SourceOutput>,

    pub(crate) default_sink: Option<u32>,
    pub(crate) default_source: Option<u32>,
    pub(crate) wanted_default_sink: Option<String>,
    pub(crate) wanted_default_source: Option<String>,

    state: BackendState,
    pub(crate) connected_once: bool,
    pub(crate) retry_armed: bool,

    events_tx: broadcast::Sender<BackendEvent>,
}

impl<F: ConnectionFactory> Backend<F> {
    /// Engine with default application details.
    pub fn new(factory: F) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            factory,
            details: AppDetails::default(),
            connection: None,
            notifications: None,
            devices: EntityCache::new(),
            sinks: EntityCache::new(),
            sink_inputs: EntityCache::new(),
            sources: EntityCache::new(),
            source_outputs: EntityCache::new(),
            default_sink: None,
            default_source: None,
            wanted_default_sink: None,
            wanted_default_source: None,
            state: BackendState::Idle,
            connected_once: false,
            retry_armed: false,
            events_tx,
        }
    }

    /// Replace the application details handed to the server on the next
    /// `open()`.
    pub fn set_app_details(&mut self, details: AppDetails) {
        self.details = details;
    }

    /// Current engine state.
    pub fn state(&self) -> BackendState {
        self.state
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<BackendEvent> {
        self.events_tx.subscribe()
    }

    /// Change events as an async stream.
    ///
    /// Lagging far enough behind to overflow the channel ends the stream.
    pub fn events(&self) -> Pin<Box<dyn FuturesStream<Item = BackendEvent> + Send>> {
        let mut rx = self.events_tx.subscribe();
        Box::pin(stream! {
            while let Ok(event) = rx.recv().await {
                yield event;
            }
        })
    }

    /// Build the connection and start the session.
    ///
    /// Idempotent while open. No connect attempt is made during connection
    /// construction; construction itself can still fail, which is terminal
    /// for the attempt.
    ///
    /// # Errors
    /// Returns an error (and moves to `Failed`) when the connection cannot
    /// be built or the connect request cannot be dispatched.
    pub fn open(&mut self) -> Result<(), BackendError> {
        if self.connection.is_some() {
            return Ok(());
        }

        let (mut connection, notifications) = match self.factory.establish(&self.details) {
            Ok(pair) => pair,
            Err(err) => {
                self.set_state(BackendState::Failed);
                return Err(BackendError::ConnectionFailed(err));
            }
        };

        // The connect request can fail either instantly or asynchronously,
        // e.g. when a remote connection times out.
        if !connection.connect() {
            self.set_state(BackendState::Failed);
            return Err(BackendError::ConnectRejected);
        }

        self.connection = Some(connection);
        self.notifications = Some(notifications);
        self.connected_once = false;
        self.retry_armed = false;
        self.set_state(BackendState::Connecting);
        Ok(())
    }

    /// Tear the session down and forget all mirrored state.
    ///
    /// Safe to call when not open, and safe to call twice.
    pub fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.disconnect();
        }
        self.notifications = None;
        self.retry_armed = false;

        self.devices.clear();
        self.sinks.clear();
        self.sink_inputs.clear();
        self.sources.clear();
        self.source_outputs.clear();

        self.default_sink = None;
        self.default_source = None;
        self.wanted_default_sink = None;
        self.wanted_default_source = None;

        self.set_state(BackendState::Idle);
    }

    /// Apply one notification to the mirror.
    ///
    /// Mutation and event emission happen atomically from the caller's
    /// perspective. Notifications arriving after `close()` are dropped.
    pub fn handle_notification(&mut self, notification: Notification) {
        if self.connection.is_none() {
            return;
        }

        match notification {
            Notification::StateChanged(state) => self.on_connection_state(state),
            Notification::ServerInfo(info) => self.on_server_info(&info),
            Notification::DeviceInfo(info) => self.on_device_info(&info),
            Notification::DeviceRemoved(index) => self.on_device_removed(index),
            Notification::SinkInfo(info) => self.on_sink_info(&info),
            Notification::SinkRemoved(index) => self.on_sink_removed(index),
            Notification::SinkInputInfo(info) => self.on_sink_input_info(&info),
            Notification::SinkInputRemoved(index) => self.on_sink_input_removed(index),
            Notification::SourceInfo(info) => self.on_source_info(&info),
            Notification::SourceRemoved(index) => self.on_source_removed(index),
            Notification::SourceOutputInfo(info) => self.on_source_output_info(&info),
            Notification::SourceOutputRemoved(index) => self.on_source_output_removed(index),
        }
    }

    /// Drive the engine until the session ends.
    ///
    /// Drains the notification channel on the calling task and, while a
    /// reconnect retry is armed, re-attempts once per loop pass. Returns
    /// when the connection drops its sending half (after `close()` or on
    /// engine teardown).
    pub async fn run(&mut self) {
        let Some(mut notifications) = self.notifications.take() else {
            return;
        };

        loop {
            if self.retry_armed {
                match notifications.try_recv() {
                    Ok(notification) => self.handle_notification(notification),
                    Err(TryRecvError::Empty) => {
                        self.reconnect_tick();
                        tokio::task::yield_now().await;
                    }
                    Err(TryRecvError::Disconnected) => break,
                }
            } else {
                match notifications.recv().await {
                    Some(notification) => self.handle_notification(notification),
                    None => break,
                }
            }
        }
    }

    /// Fresh, name-sorted snapshot of the mirrored devices.
    pub fn list_devices(&self) -> Vec<Device> {
        let mut devices = self.devices.snapshot();
        devices.sort_by(|a, b| a.name().cmp(b.name()));
        devices
    }

    /// Fresh, name-sorted snapshot of every mirrored stream: sinks, sink
    /// inputs, sources and source outputs.
    pub fn list_streams(&self) -> Vec<Stream> {
        let mut streams: Vec<Stream> = self
            .sinks
            .iter()
            .cloned()
            .map(Stream::Sink)
            .chain(self.sink_inputs.iter().cloned().map(Stream::SinkInput))
            .chain(self.sources.iter().cloned().map(Stream::Source))
            .chain(
                self.source_outputs
                    .iter()
                    .cloned()
                    .map(Stream::SourceOutput),
            )
            .collect();
        streams.sort_by(|a, b| a.name().cmp(b.name()));
        streams
    }

    /// Snapshot of one device.
    pub fn device(&self, index: u32) -> Option<Device> {
        self.devices.get(index).cloned()
    }

    /// Snapshot of one stream in the given kind's namespace.
    pub fn stream(&self, kind: StreamKind, index: u32) -> Option<Stream> {
        match kind {
            StreamKind::Sink => self.sinks.get(index).cloned().map(Stream::Sink),
            StreamKind::SinkInput => self.sink_inputs.get(index).cloned().map(Stream::SinkInput),
            StreamKind::Source => self.sources.get(index).cloned().map(Stream::Source),
            StreamKind::SourceOutput => self
                .source_outputs
                .get(index)
                .cloned()
                .map(Stream::SourceOutput),
        }
    }

    /// Currently resolved default capture endpoint.
    pub fn default_input_stream(&self) -> Option<Stream> {
        self.default_source
            .and_then(|index| self.sources.get(index))
            .cloned()
            .map(Stream::Source)
    }

    /// Currently resolved default playback endpoint.
    pub fn default_output_stream(&self) -> Option<Stream> {
        self.default_sink
            .and_then(|index| self.sinks.get(index))
            .cloned()
            .map(Stream::Sink)
    }

    /// Ask the server to switch the default capture endpoint.
    ///
    /// The change is observed later through a server-info notification.
    ///
    /// # Errors
    /// Fails when the engine is closed, the name is not a known source, or
    /// the request cannot be dispatched.
    pub fn set_default_input_stream(&mut self, name: &str) -> Result<(), BackendError> {
        if self.connection.is_none() {
            return Err(BackendError::NotOpen);
        }
        if self.sources.find_by_name(name).is_none() {
            return Err(BackendError::UnknownName {
                kind: StreamKind::Source,
                name: name.to_owned(),
            });
        }
        self.request(|connection| connection.set_default_source(name))
    }

    /// Ask the server to switch the default playback endpoint.
    ///
    /// # Errors
    /// Fails when the engine is closed, the name is not a known sink, or
    /// the request cannot be dispatched.
    pub fn set_default_output_stream(&mut self, name: &str) -> Result<(), BackendError> {
        if self.connection.is_none() {
            return Err(BackendError::NotOpen);
        }
        if self.sinks.find_by_name(name).is_none() {
            return Err(BackendError::UnknownName {
                kind: StreamKind::Sink,
                name: name.to_owned(),
            });
        }
        self.request(|connection| connection.set_default_sink(name))
    }

    /// Change a stream's mute flag.
    ///
    /// # Errors
    /// Fails when the engine is closed, the stream is unknown, or the
    /// request cannot be dispatched.
    pub fn set_stream_mute(
        &mut self,
        kind: StreamKind,
        index: u32,
        mute: bool,
    ) -> Result<(), BackendError> {
        self.ensure_stream(kind, index)?;
        self.request(|connection| connection.set_mute(kind, index, mute))
    }

    /// Change a stream's volume.
    ///
    /// # Errors
    /// Fails when the engine is closed, the stream is unknown, or the
    /// request cannot be dispatched.
    pub fn set_stream_volume(
        &mut self,
        kind: StreamKind,
        index: u32,
        volume: &Volume,
    ) -> Result<(), BackendError> {
        self.ensure_stream(kind, index)?;
        self.request(|connection| connection.set_volume(kind, index, volume))
    }

    /// Move a client stream under a new parent endpoint.
    ///
    /// # Errors
    /// Fails for endpoint kinds, for unknown streams, when the target is
    /// absent from the required endpoint cache, or when the request cannot
    /// be dispatched. Rejections leave the mirror untouched.
    pub fn move_stream(
        &mut self,
        kind: StreamKind,
        index: u32,
        target: u32,
    ) -> Result<(), BackendError> {
        let Some(parent_kind) = kind.parent_kind() else {
            return Err(BackendError::UnsupportedKind { kind });
        };
        self.ensure_stream(kind, index)?;

        let target_known = match parent_kind {
            StreamKind::Sink => self.sinks.get(target).is_some(),
            StreamKind::Source => self.sources.get(target).is_some(),
            _ => false,
        };
        if !target_known {
            warn!("Rejecting move of {kind:?} {index}: {target} is not a {parent_kind:?}");
            return Err(BackendError::InvalidTarget {
                kind,
                index,
                target,
            });
        }
        self.request(|connection| connection.move_stream(kind, index, target))
    }

    /// Kill a client stream.
    ///
    /// # Errors
    /// Fails for endpoint kinds, for unknown streams, or when the request
    /// cannot be dispatched.
    pub fn terminate_stream(&mut self, kind: StreamKind, index: u32) -> Result<(), BackendError> {
        if !kind.is_client() {
            return Err(BackendError::UnsupportedKind { kind });
        }
        self.ensure_stream(kind, index)?;
        self.request(|connection| connection.terminate(kind, index))
    }

    /// Attach a level monitor to a stream.
    ///
    /// The monitor is fed from the stream's monitor source: a sink's own
    /// monitor, the parent sink's monitor for a sink input, the source
    /// itself for sources, and the parent source for a source output.
    ///
    /// # Errors
    /// Fails when the engine is closed, the stream is unknown, no monitor
    /// source is available, or the request cannot be dispatched.
    pub fn create_stream_monitor(
        &mut self,
        kind: StreamKind,
        index: u32,
    ) -> Result<(), BackendError> {
        self.ensure_stream(kind, index)?;

        let no_monitor = BackendError::NoMonitor { kind, index };
        let (source_index, stream_index) = match kind {
            StreamKind::Sink => {
                let sink = self.sinks.get(index).ok_or(BackendError::UnknownStream {
                    kind,
                    index,
                })?;
                (sink.monitor_source.ok_or(no_monitor)?, None)
            }
            StreamKind::SinkInput => {
                let parent = self
                    .sink_inputs
                    .get(index)
                    .and_then(|input| input.parent)
                    .and_then(|parent| self.sinks.get(parent));
                let monitor = parent.and_then(|sink| sink.monitor_source);
                (monitor.ok_or(no_monitor)?, Some(index))
            }
            StreamKind::Source => (index, None),
            StreamKind::SourceOutput => {
                let parent = self
                    .source_outputs
                    .get(index)
                    .and_then(|output| output.parent);
                (parent.ok_or(no_monitor)?, Some(index))
            }
        };
        self.request(|connection| connection.create_monitor(source_index, stream_index))
    }

    pub(crate) fn set_state(&mut self, state: BackendState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.emit(BackendEvent::StateChanged(state));
    }

    pub(crate) fn emit(&self, event: BackendEvent) {
        let _ = self.events_tx.send(event);
    }

    pub(crate) fn connection_mut(&mut self) -> Option<&mut F::Connection> {
        self.connection.as_mut()
    }

    fn ensure_stream(&self, kind: StreamKind, index: u32) -> Result<(), BackendError> {
        let present = match kind {
            StreamKind::Sink => self.sinks.get(index).is_some(),
            StreamKind::SinkInput => self.sink_inputs.get(index).is_some(),
            StreamKind::Source => self.sources.get(index).is_some(),
            StreamKind::SourceOutput => self.source_outputs.get(index).is_some(),
        };
        if present {
            Ok(())
        } else {
            Err(BackendError::UnknownStream { kind, index })
        }
    }

    fn request(
        &mut self,
        dispatch: impl FnOnce(&mut F::Connection) -> bool,
    ) -> Result<(), BackendError> {
        let connection = self.connection.as_mut().ok_or(BackendError::NotOpen)?;
        if dispatch(connection) {
            Ok(())
        } else {
            Err(BackendError::RequestRejected)
        }
    }
}
