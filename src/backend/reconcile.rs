use tracing::debug;

use crate::{
    connection::{
        ConnectionFactory,
        notification::{
            DeviceDescriptor, SinkDescriptor, SinkInputDescriptor, SourceDescriptor,
            SourceOutputDescriptor,
        },
    },
    events::BackendEvent,
};

use super::Backend;

/// Add/update/remove reconciliation, one routine per entity kind.
///
/// The notification stream is only partially ordered: parents may be
/// reported after their children and removals may race late info reports.
/// Every routine here treats missing cross-references as ordinary,
/// expected states.
impl<F: ConnectionFactory> Backend<F> {
    pub(crate) fn on_device_info(&mut self, info: &DeviceDescriptor) {
        let (device, created) = self.devices.upsert(info.index, info);
        let name = device.name().to_owned();
        if created {
            self.emit(BackendEvent::DeviceAdded(name));
        } else {
            self.emit(BackendEvent::DeviceChanged(name));
        }
    }

    pub(crate) fn on_device_removed(&mut self, index: u32) {
        // The entity is gone once removed, so its name is captured first.
        if let Some(device) = self.devices.remove(index) {
            self.emit(BackendEvent::DeviceRemoved(device.name().to_owned()));
        }
    }

    pub(crate) fn on_sink_info(&mut self, info: &SinkDescriptor) {
        let (sink, created) = self.sinks.upsert(info.index, info);
        let name = sink.name().to_owned();
        if created {
            self.emit(BackendEvent::StreamAdded(name.clone()));
            self.bind_default_sink_if_wanted(info.index, &name);
        } else {
            self.emit(BackendEvent::StreamChanged(name));
        }
    }

    pub(crate) fn on_sink_removed(&mut self, index: u32) {
        let Some(sink) = self.sinks.remove(index) else {
            return;
        };

        // Children must never dangle; a later sink-input-info may re-parent
        // them under whatever the server reports then.
        for input in self.sink_inputs.iter_mut() {
            if input.parent == Some(index) {
                input.set_parent(None);
            }
        }
        if self.default_sink == Some(index) {
            self.default_sink = None;
        }

        self.emit(BackendEvent::StreamRemoved(sink.name().to_owned()));
    }

    pub(crate) fn on_sink_input_info(&mut self, info: &SinkInputDescriptor) {
        // Parent info may legitimately arrive after child info; the child
        // is mirrored with an empty parent rather than rejected.
        let parent = self.sinks.get(info.sink).map(|sink| sink.index());

        let (input, created) = self.sink_inputs.upsert(info.index, info);
        input.set_parent(parent);
        let name = input.name().to_owned();
        if created {
            self.emit(BackendEvent::StreamAdded(name));
        } else {
            self.emit(BackendEvent::StreamChanged(name));
        }
    }

    pub(crate) fn on_sink_input_removed(&mut self, index: u32) {
        if let Some(input) = self.sink_inputs.remove(index) {
            self.emit(BackendEvent::StreamRemoved(input.name().to_owned()));
        }
    }

    pub(crate) fn on_source_info(&mut self, info: &SourceDescriptor) {
        // A monitor source is a shadow capture endpoint created alongside a
        // sink, not a user-facing device; it never enters the mirror.
        if self.sources.get(info.index).is_none() && info.monitor_of_sink.is_some() {
            debug!("Ignoring monitor source {} ({})", info.index, info.name);
            return;
        }

        let (source, created) = self.sources.upsert(info.index, info);
        let name = source.name().to_owned();
        if created {
            self.emit(BackendEvent::StreamAdded(name.clone()));
            self.bind_default_source_if_wanted(info.index, &name);
        } else {
            self.emit(BackendEvent::StreamChanged(name));
        }
    }

    pub(crate) fn on_source_removed(&mut self, index: u32) {
        let Some(source) = self.sources.remove(index) else {
            return;
        };

        for output in self.source_outputs.iter_mut() {
            if output.parent == Some(index) {
                output.set_parent(None);
            }
        }
        if self.default_source == Some(index) {
            self.default_source = None;
        }

        self.emit(BackendEvent::StreamRemoved(source.name().to_owned()));
    }

    pub(crate) fn on_source_output_info(&mut self, info: &SourceOutputDescriptor) {
        let parent = self.sources.get(info.source).map(|source| source.index());

        let (output, created) = self.source_outputs.upsert(info.index, info);
        output.set_parent(parent);
        let name = output.name().to_owned();
        if created {
            self.emit(BackendEvent::StreamAdded(name));
        } else {
            self.emit(BackendEvent::StreamChanged(name));
        }
    }

    pub(crate) fn on_source_output_removed(&mut self, index: u32) {
        if let Some(output) = self.source_outputs.remove(index) {
            self.emit(BackendEvent::StreamRemoved(output.name().to_owned()));
        }
    }
}
