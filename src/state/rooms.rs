//! Per-game broadcast groups of relay connections.

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use uuid::Uuid;

/// Identifier of one relay WebSocket connection.
pub type ConnectionId = Uuid;

type Members = DashMap<ConnectionId, UnboundedSender<Message>>;

/// Rooms keyed by game id, each holding the writer channels of its members.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, Members>,
}

impl RoomRegistry {
    /// Registry without rooms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to `room`. Returns `false` when it was already a member.
    pub fn join(&self, room: &str, connection: ConnectionId, tx: UnboundedSender<Message>) -> bool {
        let members = self.rooms.entry(room.to_owned()).or_default();
        members.insert(connection, tx).is_none()
    }

    /// Remove a connection from `room`, dropping the room once empty.
    pub fn leave(&self, room: &str, connection: ConnectionId) {
        if let Some(members) = self.rooms.get(room) {
            members.remove(&connection);
        }
        self.rooms.remove_if(room, |_, members| members.is_empty());
    }

    /// Send `message` to every member of `room`, returning how many received it.
    ///
    /// Members whose writer has gone away are pruned. An unknown room is not an error.
    pub fn broadcast(&self, room: &str, message: &Message) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        if let Some(members) = self.rooms.get(room) {
            for member in members.iter() {
                if member.value().send(message.clone()).is_ok() {
                    delivered += 1;
                } else {
                    closed.push(*member.key());
                }
            }
        }

        for connection in closed {
            debug!(room, %connection, "pruning closed relay connection");
            self.leave(room, connection);
        }

        delivered
    }

    /// Connections currently in `room`.
    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map_or(0, |members| members.len())
    }

    /// Whether `connection` is a member of `room`.
    pub fn contains(&self, room: &str, connection: ConnectionId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|members| members.contains_key(&connection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn text(value: &str) -> Message {
        Message::Text(value.to_owned().into())
    }

    #[test]
    fn joining_twice_delivers_once() {
        let rooms = RoomRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();

        assert!(rooms.join("g1", id, tx.clone()));
        assert!(!rooms.join("g1", id, tx));
        assert_eq!(rooms.broadcast("g1", &text("hello")), 1);

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn broadcast_to_unknown_room_reaches_nobody() {
        let rooms = RoomRegistry::new();
        assert_eq!(rooms.broadcast("nobody-here", &text("ping")), 0);
    }

    #[test]
    fn broadcast_stays_inside_the_room() {
        let rooms = RoomRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        rooms.join("g1", Uuid::new_v4(), tx_a);
        rooms.join("g2", Uuid::new_v4(), tx_b);

        rooms.broadcast("g1", &text("score"));

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn leaving_last_member_drops_the_room() {
        let rooms = RoomRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        rooms.join("g1", id, tx);

        rooms.leave("g1", id);

        assert_eq!(rooms.member_count("g1"), 0);
        assert!(!rooms.contains("g1", id));
    }

    #[test]
    fn closed_writers_are_pruned_on_broadcast() {
        let rooms = RoomRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        rooms.join("g1", Uuid::new_v4(), tx);
        drop(rx);

        assert_eq!(rooms.broadcast("g1", &text("gone")), 0);
        assert_eq!(rooms.member_count("g1"), 0);
    }
}
