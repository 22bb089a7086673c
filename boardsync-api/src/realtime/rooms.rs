/// The per-board subscriber registry
///
/// `BoardRooms` owns the only shared mutable state of the realtime layer: a
/// map from board id to the set of live connections currently subscribed to
/// it. Connection handlers call `join`/`leave`/`disconnect` as the client
/// moves between boards; mutation handlers call `notify` after a successful
/// write.
///
/// The registry holds each connection's outbound sender. `notify`
/// serializes the frame once and walks the board's current subscriber set
/// in a single pass; sends are non-blocking (unbounded channel) and
/// failures are ignored - a connection whose receiver is gone will be
/// cleaned up by its own handler's `disconnect`.
///
/// Rooms with no subscribers are dropped from the map so idle boards retain
/// no memory.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::realtime::events::{BoardEvent, EventFrame};

/// Handle identifying one live connection
pub type ConnectionId = Uuid;

/// Sender half of a connection's outbound frame channel
pub type FrameSender = mpsc::UnboundedSender<String>;

/// Board-to-subscribers registry
#[derive(Debug, Default)]
pub struct BoardRooms {
    rooms: RwLock<HashMap<Uuid, HashMap<ConnectionId, FrameSender>>>,
}

impl BoardRooms {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a board
    ///
    /// A connection may be subscribed to any number of boards at once;
    /// joining a board twice just replaces the stored sender.
    pub async fn join(&self, board_id: Uuid, connection_id: ConnectionId, sender: FrameSender) {
        let mut rooms = self.rooms.write().await;
        rooms.entry(board_id).or_default().insert(connection_id, sender);

        debug!(%board_id, %connection_id, "connection joined board room");
    }

    /// Unsubscribes a connection from a board
    ///
    /// Dropping the last subscriber removes the room entry entirely.
    pub async fn leave(&self, board_id: Uuid, connection_id: ConnectionId) {
        let mut rooms = self.rooms.write().await;
        if let Some(members) = rooms.get_mut(&board_id) {
            members.remove(&connection_id);
            if members.is_empty() {
                rooms.remove(&board_id);
            }
        }

        debug!(%board_id, %connection_id, "connection left board room");
    }

    /// Removes a connection from every board it was subscribed to
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let mut rooms = self.rooms.write().await;
        rooms.retain(|_, members| {
            members.remove(&connection_id);
            !members.is_empty()
        });

        debug!(%connection_id, "connection removed from all board rooms");
    }

    /// Pushes an event to every connection currently subscribed to a board
    ///
    /// Best-effort fire-and-forget: the frame is serialized once, the
    /// current subscriber set is walked in one pass, and send errors are
    /// ignored. Returns the number of connections the frame was handed to.
    pub async fn notify(&self, board_id: Uuid, event: &BoardEvent) -> usize {
        let frame = EventFrame { board_id, event };
        let payload = match serde_json::to_string(&frame) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%board_id, %error, "failed to serialize realtime event");
                return 0;
            }
        };

        let rooms = self.rooms.read().await;
        let Some(members) = rooms.get(&board_id) else {
            return 0;
        };

        let mut delivered = 0;
        for sender in members.values() {
            if sender.send(payload.clone()).is_ok() {
                delivered += 1;
            }
        }

        debug!(%board_id, kind = event.kind(), delivered, "broadcast board event");

        delivered
    }

    /// Number of connections currently subscribed to a board
    pub async fn subscriber_count(&self, board_id: Uuid) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(&board_id).map_or(0, HashMap::len)
    }

    /// Number of boards with at least one subscriber
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
