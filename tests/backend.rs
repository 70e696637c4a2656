//! Integration tests for the synchronization engine.

#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::sync::{Arc, Mutex};

use pulsemix::{
    Backend, BackendEvent, BackendState,
    connection::{
        AppDetails, Connection, ConnectionError, ConnectionFactory, ConnectionState, Notification,
        NotificationReceiver,
        notification::{
            DeviceDescriptor, ServerDescriptor, SinkDescriptor, SinkInputDescriptor,
            SourceDescriptor,
        },
    },
    stream::StreamKind,
    volume::Volume,
};
use tokio::sync::mpsc::{self, UnboundedSender};

#[derive(Debug, Default)]
struct Transport {
    connect_calls: usize,
    requests: Vec<String>,
}

struct ScriptedConnection {
    transport: Arc<Mutex<Transport>>,
}

impl Connection for ScriptedConnection {
    fn state(&self) -> ConnectionState {
        ConnectionState::Disconnected
    }

    fn connect(&mut self) -> bool {
        self.transport.lock().unwrap().connect_calls += 1;
        true
    }

    fn disconnect(&mut self) {}

    fn set_default_sink(&mut self, name: &str) -> bool {
        self.log(format!("default-sink {name}"))
    }

    fn set_default_source(&mut self, name: &str) -> bool {
        self.log(format!("default-source {name}"))
    }

    fn set_mute(&mut self, kind: StreamKind, index: u32, mute: bool) -> bool {
        self.log(format!("mute {kind:?} {index} {mute}"))
    }

    fn set_volume(&mut self, kind: StreamKind, index: u32, volume: &Volume) -> bool {
        self.log(format!("volume {kind:?} {index} {}", volume.channels()))
    }

    fn move_stream(&mut self, kind: StreamKind, index: u32, target: u32) -> bool {
        self.log(format!("move {kind:?} {index} -> {target}"))
    }

    fn terminate(&mut self, kind: StreamKind, index: u32) -> bool {
        self.log(format!("terminate {kind:?} {index}"))
    }

    fn create_monitor(&mut self, source_index: u32, stream_index: Option<u32>) -> bool {
        self.log(format!("monitor {source_index} {stream_index:?}"))
    }
}

impl ScriptedConnection {
    fn log(&mut self, request: String) -> bool {
        self.transport.lock().unwrap().requests.push(request);
        true
    }
}

#[derive(Default)]
struct ScriptedFactory {
    transport: Arc<Mutex<Transport>>,
    sender_slot: Arc<Mutex<Option<UnboundedSender<Notification>>>>,
}

impl ConnectionFactory for ScriptedFactory {
    type Connection = ScriptedConnection;

    fn establish(
        &mut self,
        _details: &AppDetails,
    ) -> Result<(ScriptedConnection, NotificationReceiver), ConnectionError> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.sender_slot.lock().unwrap() = Some(tx);
        Ok((
            ScriptedConnection {
                transport: Arc::clone(&self.transport),
            },
            rx,
        ))
    }
}

struct Session {
    backend: Backend<ScriptedFactory>,
    transport: Arc<Mutex<Transport>>,
}

fn open_session() -> Session {
    let transport = Arc::new(Mutex::new(Transport::default()));
    let factory = ScriptedFactory {
        transport: Arc::clone(&transport),
        ..ScriptedFactory::default()
    };
    let mut backend = Backend::new(factory);
    backend.open().unwrap();
    backend.handle_notification(Notification::StateChanged(ConnectionState::Connected));
    Session { backend, transport }
}

fn sink(index: u32, name: &str, monitor: Option<u32>) -> SinkDescriptor {
    SinkDescriptor {
        index,
        name: name.to_owned(),
        description: name.to_owned(),
        monitor_source: monitor,
        ..Default::default()
    }
}

fn play_initial_lists(backend: &mut Backend<ScriptedFactory>) {
    backend.handle_notification(Notification::DeviceInfo(DeviceDescriptor {
        index: 0,
        name: "alsa_card.pci-0000_00_1f.3".to_owned(),
        description: "Built-in Audio".to_owned(),
        ..Default::default()
    }));
    backend.handle_notification(Notification::SinkInfo(sink(1, "alsa_output.analog", Some(10))));
    backend.handle_notification(Notification::SourceInfo(SourceDescriptor {
        index: 2,
        name: "alsa_input.analog".to_owned(),
        description: "Built-in Microphone".to_owned(),
        ..Default::default()
    }));
    backend.handle_notification(Notification::ServerInfo(ServerDescriptor {
        server_name: "pulseaudio".to_owned(),
        server_version: "17.0".to_owned(),
        host_name: "localhost".to_owned(),
        default_sink_name: Some("alsa_output.analog".to_owned()),
        default_source_name: Some("alsa_input.analog".to_owned()),
    }));
}

mod session_bringup {
    use super::*;

    #[test]
    fn initial_lists_populate_the_mirror() {
        let Session { mut backend, .. } = open_session();

        play_initial_lists(&mut backend);

        assert_eq!(backend.state(), BackendState::Ready);
        assert_eq!(backend.list_devices().len(), 1);
        assert_eq!(backend.list_streams().len(), 2);
        assert_eq!(
            backend.default_output_stream().map(|s| s.index()),
            Some(1)
        );
        assert_eq!(
            backend.default_input_stream().map(|s| s.index()),
            Some(2)
        );
    }

    #[test]
    fn events_track_the_full_bringup() {
        let Session { mut backend, .. } = open_session();
        let mut events = backend.subscribe();

        play_initial_lists(&mut backend);

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(
            seen,
            vec![
                BackendEvent::DeviceAdded("alsa_card.pci-0000_00_1f.3".to_owned()),
                BackendEvent::StreamAdded("alsa_output.analog".to_owned()),
                BackendEvent::StreamAdded("alsa_input.analog".to_owned()),
                BackendEvent::DefaultInputChanged("alsa_input.analog".to_owned()),
                BackendEvent::DefaultOutputChanged("alsa_output.analog".to_owned()),
            ]
        );
    }
}

mod client_streams {
    use super::*;

    #[test]
    fn client_lifecycle_with_controls() {
        let Session {
            mut backend,
            transport,
        } = open_session();
        play_initial_lists(&mut backend);

        backend.handle_notification(Notification::SinkInputInfo(SinkInputDescriptor {
            index: 30,
            name: "Music".to_owned(),
            sink: 1,
            volume: Some(Volume::stereo(0.8, 0.8).unwrap()),
            volume_writable: true,
            app_name: Some("player".to_owned()),
            ..Default::default()
        }));

        let stream = backend.stream(StreamKind::SinkInput, 30).unwrap();
        assert_eq!(stream.name(), "playback-stream-30");
        assert_eq!(stream.parent(), Some(1));

        backend
            .set_stream_mute(StreamKind::SinkInput, 30, true)
            .unwrap();
        backend
            .set_stream_volume(
                StreamKind::SinkInput,
                30,
                &Volume::stereo(0.5, 0.5).unwrap(),
            )
            .unwrap();
        // The parent sink's monitor source feeds the client's monitor.
        backend
            .create_stream_monitor(StreamKind::SinkInput, 30)
            .unwrap();
        backend
            .terminate_stream(StreamKind::SinkInput, 30)
            .unwrap();

        assert_eq!(
            transport.lock().unwrap().requests,
            vec![
                "mute SinkInput 30 true",
                "volume SinkInput 30 2",
                "monitor 10 Some(30)",
                "terminate SinkInput 30",
            ]
        );

        backend.handle_notification(Notification::SinkInputRemoved(30));
        assert!(backend.stream(StreamKind::SinkInput, 30).is_none());
    }

    #[test]
    fn default_switch_round_trips_through_server_info() {
        let Session {
            mut backend,
            transport,
        } = open_session();
        play_initial_lists(&mut backend);
        backend.handle_notification(Notification::SinkInfo(sink(5, "usb_headset", None)));

        backend.set_default_output_stream("usb_headset").unwrap();
        assert_eq!(
            transport.lock().unwrap().requests,
            vec!["default-sink usb_headset"]
        );
        // The slot only moves once the server confirms.
        assert_eq!(
            backend.default_output_stream().map(|s| s.index()),
            Some(1)
        );

        backend.handle_notification(Notification::ServerInfo(ServerDescriptor {
            default_sink_name: Some("usb_headset".to_owned()),
            default_source_name: Some("alsa_input.analog".to_owned()),
            ..Default::default()
        }));
        assert_eq!(
            backend.default_output_stream().map(|s| s.index()),
            Some(5)
        );
    }
}

mod session_loss {
    use super::*;

    #[test]
    fn disconnect_after_bringup_reconnects_and_rebuilds() {
        let Session {
            mut backend,
            transport,
        } = open_session();
        play_initial_lists(&mut backend);
        let connects_before = transport.lock().unwrap().connect_calls;

        backend.handle_notification(Notification::StateChanged(ConnectionState::Disconnected));
        assert_eq!(
            transport.lock().unwrap().connect_calls,
            connects_before + 1
        );

        // The server replays its lists after the reconnect completes.
        backend.handle_notification(Notification::StateChanged(ConnectionState::Connected));
        play_initial_lists(&mut backend);
        assert_eq!(backend.state(), BackendState::Ready);
        assert_eq!(backend.list_streams().len(), 2);
    }
}

mod event_loop {
    use super::*;

    #[tokio::test]
    async fn run_applies_a_scripted_session() {
        let transport = Arc::new(Mutex::new(Transport::default()));
        let sender_slot = Arc::new(Mutex::new(None));
        let factory = ScriptedFactory {
            transport: Arc::clone(&transport),
            sender_slot: Arc::clone(&sender_slot),
        };
        let mut backend = Backend::new(factory);
        backend.open().unwrap();

        let tx = sender_slot.lock().unwrap().take().unwrap();
        tx.send(Notification::StateChanged(ConnectionState::Connected))
            .unwrap();
        tx.send(Notification::SinkInfo(sink(1, "alsa_output.analog", None)))
            .unwrap();
        tx.send(Notification::ServerInfo(ServerDescriptor {
            default_sink_name: Some("alsa_output.analog".to_owned()),
            ..Default::default()
        }))
        .unwrap();
        drop(tx);

        backend.run().await;

        assert_eq!(backend.state(), BackendState::Ready);
        assert_eq!(
            backend.default_output_stream().map(|s| s.index()),
            Some(1)
        );

        backend.close();
        assert_eq!(backend.state(), BackendState::Idle);
        assert!(backend.list_streams().is_empty());
    }
}
