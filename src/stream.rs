use bitflags::bitflags;

use crate::{
    cache::CacheEntity,
    connection::notification::{
        SinkDescriptor, SinkInputDescriptor, SourceDescriptor, SourceOutputDescriptor,
    },
    volume::Volume,
};

/// Name prefix for synthesized playback client-stream identifiers.
pub const PLAYBACK_STREAM_PREFIX: &str = "playback-stream-";

/// Name prefix for synthesized capture client-stream identifiers.
pub const RECORD_STREAM_PREFIX: &str = "record-stream-";

/// Closed set of stream kinds the engine mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Playback endpoint.
    Sink,
    /// Playback client stream.
    SinkInput,
    /// Capture endpoint.
    Source,
    /// Capture client stream.
    SourceOutput,
}

impl StreamKind {
    /// Whether this kind is a client stream rather than an endpoint.
    pub fn is_client(self) -> bool {
        matches!(self, Self::SinkInput | Self::SourceOutput)
    }

    /// The endpoint kind a client stream of this kind parents under.
    pub fn parent_kind(self) -> Option<Self> {
        match self {
            Self::SinkInput => Some(Self::Sink),
            Self::SourceOutput => Some(Self::Source),
            Self::Sink | Self::Source => None,
        }
    }
}

bitflags! {
    /// Capability set shared by all stream kinds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StreamCapabilities: u32 {
        /// The stream has a mute switch.
        const HAS_MUTE = 1 << 0;
        /// The stream reports a volume.
        const HAS_VOLUME = 1 << 1;
        /// The volume may be written.
        const CAN_SET_VOLUME = 1 << 2;
        /// Channel layout supports left/right balance.
        const CAN_BALANCE = 1 << 3;
        /// Channel layout supports front/rear fade.
        const CAN_FADE = 1 << 4;
        /// A level monitor can be attached.
        const HAS_MONITOR = 1 << 5;
        /// The stream belongs to an application.
        const APPLICATION = 1 << 6;
        /// Short event sound rather than a regular stream.
        const EVENT = 1 << 7;
    }
}

/// Application metadata attached to client streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppInfo {
    /// Application name.
    pub name: Option<String>,
    /// Application identifier.
    pub id: Option<String>,
    /// Application icon name.
    pub icon: Option<String>,
}

/// Playback endpoint mirrored from the server.
#[derive(Debug, Clone)]
pub struct Sink {
    index: u32,
    name: String,
    /// Human-readable label, mutable across updates.
    pub description: String,
    /// Mute flag.
    pub mute: bool,
    /// Per-channel volume.
    pub volume: Volume,
    /// Index of the shadow capture endpoint mirroring this sink.
    pub monitor_source: Option<u32>,
    /// Capability set.
    pub capabilities: StreamCapabilities,
}

impl Sink {
    /// Server-assigned index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Server-side endpoint name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl CacheEntity for Sink {
    type Payload = SinkDescriptor;

    fn create(index: u32, payload: &SinkDescriptor) -> Self {
        let mut sink = Self {
            index,
            name: payload.name.clone(),
            description: String::new(),
            mute: false,
            volume: Volume::default(),
            monitor_source: None,
            capabilities: StreamCapabilities::empty(),
        };
        sink.apply(payload);
        sink
    }

    fn apply(&mut self, payload: &SinkDescriptor) {
        let mut capabilities = StreamCapabilities::HAS_MUTE
            | StreamCapabilities::HAS_VOLUME
            | StreamCapabilities::CAN_SET_VOLUME;
        capabilities.set(StreamCapabilities::CAN_BALANCE, payload.can_balance);
        capabilities.set(StreamCapabilities::CAN_FADE, payload.can_fade);
        capabilities.set(
            StreamCapabilities::HAS_MONITOR,
            payload.monitor_source.is_some(),
        );

        self.description = payload.description.clone();
        self.mute = payload.mute;
        self.volume = payload.volume.clone();
        self.monitor_source = payload.monitor_source;
        self.capabilities = capabilities;
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Capture endpoint mirrored from the server.
#[derive(Debug, Clone)]
pub struct Source {
    index: u32,
    name: String,
    /// Human-readable label, mutable across updates.
    pub description: String,
    /// Mute flag.
    pub mute: bool,
    /// Per-channel volume.
    pub volume: Volume,
    /// Set when this source mirrors a sink's output.
    pub monitor_of_sink: Option<u32>,
    /// Capability set.
    pub capabilities: StreamCapabilities,
}

impl Source {
    /// Server-assigned index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Server-side endpoint name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl CacheEntity for Source {
    type Payload = SourceDescriptor;

    fn create(index: u32, payload: &SourceDescriptor) -> Self {
        let mut source = Self {
            index,
            name: payload.name.clone(),
            description: String::new(),
            mute: false,
            volume: Volume::default(),
            monitor_of_sink: None,
            capabilities: StreamCapabilities::empty(),
        };
        source.apply(payload);
        source
    }

    fn apply(&mut self, payload: &SourceDescriptor) {
        let mut capabilities = StreamCapabilities::HAS_MUTE
            | StreamCapabilities::HAS_VOLUME
            | StreamCapabilities::CAN_SET_VOLUME;
        capabilities.set(StreamCapabilities::CAN_BALANCE, payload.can_balance);
        capabilities.set(StreamCapabilities::CAN_FADE, payload.can_fade);

        self.description = payload.description.clone();
        self.mute = payload.mute;
        self.volume = payload.volume.clone();
        self.monitor_of_sink = payload.monitor_of_sink;
        self.capabilities = capabilities;
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Playback client stream mirrored from the server.
#[derive(Debug, Clone)]
pub struct SinkInput {
    index: u32,
    name: String,
    /// Human-readable label, mutable across updates.
    pub description: String,
    /// Mute flag.
    pub mute: bool,
    /// Per-channel volume, absent for streams without one.
    pub volume: Option<Volume>,
    /// Non-owning reference into the sink cache; empty when the parent has
    /// not been seen yet or disappeared first.
    pub parent: Option<u32>,
    /// Owning application, when known.
    pub app: AppInfo,
    /// Capability set.
    pub capabilities: StreamCapabilities,
}

impl SinkInput {
    /// Server-assigned index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Synthesized identifier, stable even when the server-advertised title
    /// changes or duplicates.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_parent(&mut self, parent: Option<u32>) {
        self.parent = parent;
    }
}

impl CacheEntity for SinkInput {
    type Payload = SinkInputDescriptor;

    fn create(index: u32, payload: &SinkInputDescriptor) -> Self {
        let mut input = Self {
            index,
            name: format!("{PLAYBACK_STREAM_PREFIX}{index}"),
            description: String::new(),
            mute: false,
            volume: None,
            parent: None,
            app: AppInfo::default(),
            capabilities: StreamCapabilities::empty(),
        };
        input.apply(payload);
        input
    }

    fn apply(&mut self, payload: &SinkInputDescriptor) {
        let mut capabilities = StreamCapabilities::HAS_MUTE | StreamCapabilities::HAS_MONITOR;
        capabilities.set(StreamCapabilities::CAN_BALANCE, payload.can_balance);
        capabilities.set(StreamCapabilities::CAN_FADE, payload.can_fade);
        capabilities.set(StreamCapabilities::HAS_VOLUME, payload.volume.is_some());
        capabilities.set(StreamCapabilities::CAN_SET_VOLUME, payload.volume_writable);
        capabilities.set(
            StreamCapabilities::APPLICATION,
            payload.app_name.is_some() || payload.app_id.is_some(),
        );

        // Event streams carry a far more readable description than the
        // stream title.
        let is_event = payload.media_role.as_deref() == Some("event");
        capabilities.set(StreamCapabilities::EVENT, is_event);
        self.description = if is_event {
            payload
                .event_description
                .clone()
                .unwrap_or_else(|| payload.name.clone())
        } else {
            payload.name.clone()
        };

        self.mute = payload.mute;
        self.volume = payload.volume.clone();
        self.app = AppInfo {
            name: payload.app_name.clone(),
            id: payload.app_id.clone(),
            icon: payload.app_icon.clone(),
        };
        self.capabilities = capabilities;
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Capture client stream mirrored from the server.
#[derive(Debug, Clone)]
pub struct SourceOutput {
    index: u32,
    name: String,
    /// Human-readable label, mutable across updates.
    pub description: String,
    /// Mute flag.
    pub mute: bool,
    /// Per-channel volume, absent for streams without one.
    pub volume: Option<Volume>,
    /// Non-owning reference into the source cache.
    pub parent: Option<u32>,
    /// Owning application, when known.
    pub app: AppInfo,
    /// Capability set.
    pub capabilities: StreamCapabilities,
}

impl SourceOutput {
    /// Server-assigned index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Synthesized identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_parent(&mut self, parent: Option<u32>) {
        self.parent = parent;
    }
}

impl CacheEntity for SourceOutput {
    type Payload = SourceOutputDescriptor;

    fn create(index: u32, payload: &SourceOutputDescriptor) -> Self {
        let mut output = Self {
            index,
            name: format!("{RECORD_STREAM_PREFIX}{index}"),
            description: String::new(),
            mute: false,
            volume: None,
            parent: None,
            app: AppInfo::default(),
            capabilities: StreamCapabilities::empty(),
        };
        output.apply(payload);
        output
    }

    fn apply(&mut self, payload: &SourceOutputDescriptor) {
        let mut capabilities = StreamCapabilities::HAS_MUTE;
        capabilities.set(StreamCapabilities::CAN_BALANCE, payload.can_balance);
        capabilities.set(StreamCapabilities::CAN_FADE, payload.can_fade);
        capabilities.set(StreamCapabilities::HAS_VOLUME, payload.volume.is_some());
        capabilities.set(StreamCapabilities::CAN_SET_VOLUME, payload.volume_writable);
        capabilities.set(
            StreamCapabilities::APPLICATION,
            payload.app_name.is_some() || payload.app_id.is_some(),
        );

        self.description = payload.name.clone();
        self.mute = payload.mute;
        self.volume = payload.volume.clone();
        self.app = AppInfo {
            name: payload.app_name.clone(),
            id: payload.app_id.clone(),
            icon: payload.app_icon.clone(),
        };
        self.capabilities = capabilities;
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Point-in-time copy of one stream of any kind, as handed to consumers.
#[derive(Debug, Clone)]
pub enum Stream {
    /// Playback endpoint.
    Sink(Sink),
    /// Playback client stream.
    SinkInput(SinkInput),
    /// Capture endpoint.
    Source(Source),
    /// Capture client stream.
    SourceOutput(SourceOutput),
}

impl Stream {
    /// Kind tag of the snapshot.
    pub fn kind(&self) -> StreamKind {
        match self {
            Self::Sink(_) => StreamKind::Sink,
            Self::SinkInput(_) => StreamKind::SinkInput,
            Self::Source(_) => StreamKind::Source,
            Self::SourceOutput(_) => StreamKind::SourceOutput,
        }
    }

    /// Server-assigned index within the kind's namespace.
    pub fn index(&self) -> u32 {
        match self {
            Self::Sink(s) => s.index(),
            Self::SinkInput(s) => s.index(),
            Self::Source(s) => s.index(),
            Self::SourceOutput(s) => s.index(),
        }
    }

    /// Stable identifier.
    pub fn name(&self) -> &str {
        match self {
            Self::Sink(s) => s.name(),
            Self::SinkInput(s) => s.name(),
            Self::Source(s) => s.name(),
            Self::SourceOutput(s) => s.name(),
        }
    }

    /// Human-readable label.
    pub fn description(&self) -> &str {
        match self {
            Self::Sink(s) => &s.description,
            Self::SinkInput(s) => &s.description,
            Self::Source(s) => &s.description,
            Self::SourceOutput(s) => &s.description,
        }
    }

    /// Mute flag.
    pub fn is_muted(&self) -> bool {
        match self {
            Self::Sink(s) => s.mute,
            Self::SinkInput(s) => s.mute,
            Self::Source(s) => s.mute,
            Self::SourceOutput(s) => s.mute,
        }
    }

    /// Per-channel volume, when the stream has one.
    pub fn volume(&self) -> Option<&Volume> {
        match self {
            Self::Sink(s) => Some(&s.volume),
            Self::Source(s) => Some(&s.volume),
            Self::SinkInput(s) => s.volume.as_ref(),
            Self::SourceOutput(s) => s.volume.as_ref(),
        }
    }

    /// Capability set.
    pub fn capabilities(&self) -> StreamCapabilities {
        match self {
            Self::Sink(s) => s.capabilities,
            Self::SinkInput(s) => s.capabilities,
            Self::Source(s) => s.capabilities,
            Self::SourceOutput(s) => s.capabilities,
        }
    }

    /// Parent endpoint index for client streams, `None` for endpoints or
    /// unparented clients.
    pub fn parent(&self) -> Option<u32> {
        match self {
            Self::SinkInput(s) => s.parent,
            Self::SourceOutput(s) => s.parent,
            Self::Sink(_) | Self::Source(_) => None,
        }
    }
}
