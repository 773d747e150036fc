//! Live collaboration over WebSocket.
//!
//! Clients connect to `/ws?token=<access token>` and join per-media rooms.
//! Comment and annotation events emitted by one client are relayed to the
//! other members of the room. Nothing is persisted here; clients save through
//! the REST endpoints and emit the saved record.
//!
//! ## Events
//!
//! Frames are JSON objects `{"event": "...", "data": ...}`.
//!
//! | Direction | Event | Data |
//! |-----------|-------|------|
//! | client → server | `join-media` | media id |
//! | client → server | `leave-media` | media id |
//! | client → server | `new-comment` | `{mediaId, comment}` |
//! | client → server | `new-annotation` | `{mediaId, annotation}` |
//! | server → client | `joined-media` / `left-media` | `{mediaId}` |
//! | server → client | `new-comment` / `new-annotation` | relayed record |
//! | server → client | `error` | `{message}` |

pub mod handler;
pub mod hub;
pub mod protocol;
pub mod routes;

pub use handler::RealtimeState;
pub use hub::RoomHub;
