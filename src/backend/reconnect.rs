use tracing::debug;

use crate::connection::{Connection, ConnectionFactory, ConnectionState};

use super::{Backend, BackendState};

/// Connection-loss supervision.
///
/// A disconnect before the first successful connection is terminal; after
/// one, the supervisor keeps re-dispatching connect attempts. Attempts are
/// fire-and-forget: the dispatch result only says whether the request went
/// out, the outcome arrives as a later state notification.
impl<F: ConnectionFactory> Backend<F> {
    pub(crate) fn on_connection_state(&mut self, state: ConnectionState) {
        match state {
            ConnectionState::Disconnected => {
                if !self.connected_once {
                    // First connection attempt failed.
                    self.set_state(BackendState::Failed);
                    return;
                }

                // A retry already armed keeps trying on its own; arming a
                // second one is a no-op by contract.
                if self.retry_armed {
                    return;
                }
                let dispatched = self
                    .connection_mut()
                    .is_some_and(Connection::connect);
                if !dispatched {
                    debug!("Immediate reconnect not dispatched, arming retry");
                    self.retry_armed = true;
                }
            }
            ConnectionState::Connecting
            | ConnectionState::Authorizing
            | ConnectionState::Loading => {
                self.set_state(BackendState::Connecting);
            }
            ConnectionState::Connected => {
                self.connected_once = true;
                self.set_state(BackendState::Ready);
            }
        }
    }

    /// One armed-retry pass, driven from the run loop.
    ///
    /// Disarms itself on the first successfully dispatched attempt and
    /// reports whether the retry is still armed.
    pub(crate) fn reconnect_tick(&mut self) -> bool {
        if !self.retry_armed {
            return false;
        }
        let dispatched = self
            .connection_mut()
            .is_some_and(Connection::connect);
        if dispatched {
            debug!("Reconnect dispatched, disarming retry");
            self.retry_armed = false;
        }
        self.retry_armed
    }
}
