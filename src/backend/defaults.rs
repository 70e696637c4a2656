use tracing::debug;

use crate::{
    cache::CacheEntity,
    connection::{ConnectionFactory, notification::ServerDescriptor},
    events::BackendEvent,
};

use super::{Backend, BackendState};

/// Default-slot resolution.
///
/// The server reports defaults by name, possibly before the named endpoint
/// has been mirrored. Slots therefore resolve from two directions: from
/// server-info notifications against the caches, and from endpoint arrival
/// against the last reported (still wanted) name.
impl<F: ConnectionFactory> Backend<F> {
    pub(crate) fn on_server_info(&mut self, info: &ServerDescriptor) {
        self.resolve_default_source(info.default_source_name.as_deref());
        self.resolve_default_sink(info.default_sink_name.as_deref());

        if self.state() != BackendState::Ready {
            debug!(
                "Sound server is {} version {}, running on {}",
                info.server_name, info.server_version, info.host_name
            );
        }
    }

    fn resolve_default_sink(&mut self, reported: Option<&str>) {
        // The server repeats identical info freely; an unchanged name means
        // no work, even while the slot is still waiting for its entity. An
        // absent name and an empty one are the same thing.
        let reported = reported.unwrap_or_default();
        if self.wanted_default_sink.as_deref().unwrap_or_default() == reported {
            return;
        }

        self.default_sink = None;
        self.wanted_default_sink = (!reported.is_empty()).then(|| reported.to_owned());
        if reported.is_empty() {
            return;
        }

        // The stream list may not have delivered this entity yet; a later
        // stream-added will bind it.
        match self.sinks.find_by_name(reported).map(CacheEntity::index) {
            Some(index) => {
                self.default_sink = Some(index);
                debug!("Default output stream changed to {reported}");
                self.emit(BackendEvent::DefaultOutputChanged(reported.to_owned()));
            }
            None => debug!("Default output stream {reported} not yet known"),
        }
    }

    fn resolve_default_source(&mut self, reported: Option<&str>) {
        let reported = reported.unwrap_or_default();
        if self.wanted_default_source.as_deref().unwrap_or_default() == reported {
            return;
        }

        self.default_source = None;
        self.wanted_default_source = (!reported.is_empty()).then(|| reported.to_owned());
        if reported.is_empty() {
            return;
        }

        match self.sources.find_by_name(reported).map(CacheEntity::index) {
            Some(index) => {
                self.default_source = Some(index);
                debug!("Default input stream changed to {reported}");
                self.emit(BackendEvent::DefaultInputChanged(reported.to_owned()));
            }
            None => debug!("Default input stream {reported} not yet known"),
        }
    }

    /// Called from the sink-added path: an unresolved default name binds as
    /// soon as its entity appears, without waiting for another server-info.
    pub(crate) fn bind_default_sink_if_wanted(&mut self, index: u32, name: &str) {
        if self.default_sink.is_some() || self.wanted_default_sink.as_deref() != Some(name) {
            return;
        }
        self.default_sink = Some(index);
        debug!("Default output stream changed to {name}");
        self.emit(BackendEvent::DefaultOutputChanged(name.to_owned()));
    }

    /// Source-added counterpart of the sink binding above.
    pub(crate) fn bind_default_source_if_wanted(&mut self, index: u32, name: &str) {
        if self.default_source.is_some() || self.wanted_default_source.as_deref() != Some(name) {
            return;
        }
        self.default_source = Some(index);
        debug!("Default input stream changed to {name}");
        self.emit(BackendEvent::DefaultInputChanged(name.to_owned()));
    }
}
