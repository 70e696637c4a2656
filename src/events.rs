use crate::backend::BackendState;

/// Change events emitted by the engine.
///
/// Entity events carry the stable entity name; consumers fetch details
/// through the listing and lookup APIs. Emission is synchronous with the
/// mutation: by the time an observer sees the event, the caches already
/// reflect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// A device entered the cache.
    DeviceAdded(String),
    /// A cached device was updated in place.
    DeviceChanged(String),
    /// A device left the cache.
    DeviceRemoved(String),

    /// A stream of any kind entered its cache.
    StreamAdded(String),
    /// A cached stream was updated in place.
    StreamChanged(String),
    /// A stream left its cache.
    StreamRemoved(String),

    /// The default capture endpoint resolved to a new entity.
    DefaultInputChanged(String),
    /// The default playback endpoint resolved to a new entity.
    DefaultOutputChanged(String),

    /// The engine moved to a new lifecycle state.
    StateChanged(BackendState),
}
