//! Media rooms for relaying collaboration events.
//!
//! Each media id with at least one joined connection owns a
//! `tokio::sync::broadcast` channel. A relayed frame reaches every receiver
//! in the room, including the sender's; connections drop frames whose
//! `origin` is their own id.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Connection-scoped identifier, distinct from the user id so one user may
/// hold several sockets.
pub type ConnectionId = Uuid;

/// A pre-encoded frame relayed through a room
#[derive(Debug, Clone)]
pub struct RoomMessage {
    pub origin: ConnectionId,
    pub frame: Arc<str>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("Join media {0} before emitting to it")]
    NotJoined(Uuid),
}

struct Room {
    sender: broadcast::Sender<RoomMessage>,
    members: HashSet<ConnectionId>,
}

/// Registry of media rooms
pub struct RoomHub {
    rooms: RwLock<HashMap<Uuid, Room>>,
    capacity: usize,
    connections: AtomicUsize,
}

impl RoomHub {
    /// `capacity` is the number of frames buffered per receiver before a
    /// slow connection starts losing them.
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            capacity,
            connections: AtomicUsize::new(0),
        }
    }

    pub fn connection_opened(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn member_count(&self, media_id: Uuid) -> usize {
        self.rooms
            .read()
            .await
            .get(&media_id)
            .map(|room| room.members.len())
            .unwrap_or(0)
    }

    /// Add a connection to a room, creating the room if needed
    pub async fn join(&self, media_id: Uuid, conn: ConnectionId) -> broadcast::Receiver<RoomMessage> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(media_id).or_insert_with(|| Room {
            sender: broadcast::channel(self.capacity).0,
            members: HashSet::new(),
        });
        room.members.insert(conn);
        room.sender.subscribe()
    }

    /// Remove a connection from a room; the room is dropped once empty.
    ///
    /// Returns whether the connection was a member.
    pub async fn leave(&self, media_id: Uuid, conn: ConnectionId) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get_mut(&media_id) else {
            return false;
        };
        let was_member = room.members.remove(&conn);
        if room.members.is_empty() {
            rooms.remove(&media_id);
        }
        was_member
    }

    /// Relay a frame to the room. Returns the number of receivers it reached,
    /// the sender's own included.
    pub async fn broadcast(
        &self,
        media_id: Uuid,
        origin: ConnectionId,
        frame: String,
    ) -> Result<usize, RoomError> {
        let rooms = self.rooms.read().await;
        let room = rooms
            .get(&media_id)
            .filter(|room| room.members.contains(&origin))
            .ok_or(RoomError::NotJoined(media_id))?;

        let message = RoomMessage {
            origin,
            frame: Arc::from(frame),
        };
        Ok(room.sender.send(message).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_join_and_leave_drops_empty_room() {
        let hub = RoomHub::new(16);
        let media = Uuid::new_v4();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let _rx_a = hub.join(media, a).await;
        let _rx_b = hub.join(media, b).await;
        assert_eq!(hub.room_count().await, 1);
        assert_eq!(hub.member_count(media).await, 2);

        assert!(hub.leave(media, a).await);
        assert_eq!(hub.room_count().await, 1);
        assert_eq!(hub.member_count(media).await, 1);

        assert!(hub.leave(media, b).await);
        assert_eq!(hub.room_count().await, 0);
        assert!(!hub.leave(media, b).await);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_room_members_with_origin() {
        let hub = RoomHub::new(16);
        let media = Uuid::new_v4();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let mut rx_a = hub.join(media, a).await;
        let mut rx_b = hub.join(media, b).await;

        let reached = hub.broadcast(media, a, "frame".to_string()).await.unwrap();
        assert_eq!(reached, 2);

        let seen_by_b = rx_b.recv().await.unwrap();
        assert_eq!(seen_by_b.origin, a);
        assert_eq!(&*seen_by_b.frame, "frame");
        assert_eq!(rx_a.recv().await.unwrap().origin, a);
    }

    #[tokio::test]
    async fn test_broadcast_requires_membership() {
        let hub = RoomHub::new(16);
        let media = Uuid::new_v4();
        let outsider = Uuid::new_v4();

        assert_eq!(
            hub.broadcast(media, outsider, "x".into()).await,
            Err(RoomError::NotJoined(media))
        );

        let _rx = hub.join(media, Uuid::new_v4()).await;
        assert_eq!(
            hub.broadcast(media, outsider, "x".into()).await,
            Err(RoomError::NotJoined(media))
        );
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let hub = RoomHub::new(16);
        let (m1, m2) = (Uuid::new_v4(), Uuid::new_v4());
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let _rx_a = hub.join(m1, a).await;
        let mut rx_b = hub.join(m2, b).await;

        hub.broadcast(m1, a, "only m1".into()).await.unwrap();
        assert!(matches!(
            rx_b.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn test_connection_counter() {
        let hub = RoomHub::new(4);
        hub.connection_opened();
        hub.connection_opened();
        hub.connection_closed();
        assert_eq!(hub.connection_count(), 1);
    }
}
