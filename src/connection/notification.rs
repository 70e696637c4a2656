use crate::volume::Volume;

use super::ConnectionState;

/// One asynchronous report from the server, in arrival order.
///
/// Info and removal notifications may interleave arbitrarily with respect to
/// the requests that caused them; the engine reconciles rather than assumes
/// ordering.
#[derive(Debug, Clone)]
pub enum Notification {
    /// The session moved to a new lifecycle state.
    StateChanged(ConnectionState),
    /// Server-wide metadata, including the default endpoint names.
    ServerInfo(ServerDescriptor),
    /// A device appeared or changed.
    DeviceInfo(DeviceDescriptor),
    /// A device disappeared.
    DeviceRemoved(u32),
    /// A playback endpoint appeared or changed.
    SinkInfo(SinkDescriptor),
    /// A playback endpoint disappeared.
    SinkRemoved(u32),
    /// A playback client stream appeared or changed.
    SinkInputInfo(SinkInputDescriptor),
    /// A playback client stream disappeared.
    SinkInputRemoved(u32),
    /// A capture endpoint appeared or changed.
    SourceInfo(SourceDescriptor),
    /// A capture endpoint disappeared.
    SourceRemoved(u32),
    /// A capture client stream appeared or changed.
    SourceOutputInfo(SourceOutputDescriptor),
    /// A capture client stream disappeared.
    SourceOutputRemoved(u32),
}

/// Server metadata reported on connect and on server-side changes.
#[derive(Debug, Clone, Default)]
pub struct ServerDescriptor {
    /// Server software name.
    pub server_name: String,
    /// Server software version.
    pub server_version: String,
    /// Host the server runs on.
    pub host_name: String,
    /// Name of the current default playback endpoint, if any.
    pub default_sink_name: Option<String>,
    /// Name of the current default capture endpoint, if any.
    pub default_source_name: Option<String>,
}

/// Selectable port on a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    /// Port identifier.
    pub name: String,
    /// Human-readable label.
    pub description: String,
    /// Server-assigned priority.
    pub priority: u32,
    /// Whether the port is currently usable.
    pub available: bool,
}

/// Selectable profile on a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDescriptor {
    /// Profile identifier.
    pub name: String,
    /// Human-readable label.
    pub description: String,
    /// Server-assigned priority.
    pub priority: u32,
}

/// Snapshot of a device's state.
#[derive(Debug, Clone, Default)]
pub struct DeviceDescriptor {
    /// Server-assigned index, stable for the connection lifetime.
    pub index: u32,
    /// Server-side device name.
    pub name: String,
    /// Human-readable label.
    pub description: String,
    /// Ports offered by the device.
    pub ports: Vec<PortDescriptor>,
    /// Name of the active port, if any.
    pub active_port: Option<String>,
    /// Profiles offered by the device.
    pub profiles: Vec<ProfileDescriptor>,
    /// Name of the active profile, if any.
    pub active_profile: Option<String>,
}

/// Snapshot of a playback endpoint's state.
#[derive(Debug, Clone, Default)]
pub struct SinkDescriptor {
    /// Server-assigned index.
    pub index: u32,
    /// Server-side endpoint name; default resolution matches on this.
    pub name: String,
    /// Human-readable label.
    pub description: String,
    /// Mute flag.
    pub mute: bool,
    /// Per-channel volume.
    pub volume: Volume,
    /// Index of the shadow capture endpoint mirroring this sink, if any.
    pub monitor_source: Option<u32>,
    /// Whether the channel layout supports left/right balance.
    pub can_balance: bool,
    /// Whether the channel layout supports front/rear fade.
    pub can_fade: bool,
}

/// Snapshot of a capture endpoint's state.
#[derive(Debug, Clone, Default)]
pub struct SourceDescriptor {
    /// Server-assigned index.
    pub index: u32,
    /// Server-side endpoint name.
    pub name: String,
    /// Human-readable label.
    pub description: String,
    /// Mute flag.
    pub mute: bool,
    /// Per-channel volume.
    pub volume: Volume,
    /// Set when this source merely mirrors a sink's output; such sources are
    /// not user-facing capture devices.
    pub monitor_of_sink: Option<u32>,
    /// Whether the channel layout supports left/right balance.
    pub can_balance: bool,
    /// Whether the channel layout supports front/rear fade.
    pub can_fade: bool,
}

/// Snapshot of a playback client stream's state.
#[derive(Debug, Clone, Default)]
pub struct SinkInputDescriptor {
    /// Server-assigned index.
    pub index: u32,
    /// Server-advertised stream title; used for the description only, never
    /// as the identifier.
    pub name: String,
    /// Index of the sink the stream plays into.
    pub sink: u32,
    /// Mute flag.
    pub mute: bool,
    /// Per-channel volume, absent for streams without one.
    pub volume: Option<Volume>,
    /// Whether the volume may be written.
    pub volume_writable: bool,
    /// Whether the channel layout supports left/right balance.
    pub can_balance: bool,
    /// Whether the channel layout supports front/rear fade.
    pub can_fade: bool,
    /// Owning application name, when the stream belongs to one.
    pub app_name: Option<String>,
    /// Owning application identifier.
    pub app_id: Option<String>,
    /// Owning application icon name.
    pub app_icon: Option<String>,
    /// Media role, e.g. `event` for short notification sounds.
    pub media_role: Option<String>,
    /// Description attached to event-role streams; preferred over `name`
    /// for those.
    pub event_description: Option<String>,
}

/// Snapshot of a capture client stream's state.
#[derive(Debug, Clone, Default)]
pub struct SourceOutputDescriptor {
    /// Server-assigned index.
    pub index: u32,
    /// Server-advertised stream title.
    pub name: String,
    /// Index of the source the stream records from.
    pub source: u32,
    /// Mute flag.
    pub mute: bool,
    /// Per-channel volume, absent for streams without one.
    pub volume: Option<Volume>,
    /// Whether the volume may be written.
    pub volume_writable: bool,
    /// Whether the channel layout supports left/right balance.
    pub can_balance: bool,
    /// Whether the channel layout supports front/rear fade.
    pub can_fade: bool,
    /// Owning application name, when the stream belongs to one.
    pub app_name: Option<String>,
    /// Owning application identifier.
    pub app_id: Option<String>,
    /// Owning application icon name.
    pub app_icon: Option<String>,
}
