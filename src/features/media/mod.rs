//! Media items: upload, listing, rename, delete.
//!
//! Files go to the configured [`MediaStorage`](crate::modules::storage::MediaStorage)
//! backend; metadata lives in the `media` table. [`AccessService`] computes the
//! caller's effective permission and is shared with every feature that
//! scopes data to a media item.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Permission | Description |
//! |--------|----------|------------|-------------|
//! | POST | `/api/media/upload` | - | Upload image/video (multipart) |
//! | GET | `/api/media` | - | Caller's own media |
//! | GET | `/api/media/{id}` | viewer | Media item with caller's permission |
//! | PATCH | `/api/media/{id}` | owner | Rename |
//! | DELETE | `/api/media/{id}` | owner | Delete with comments, annotations, shares |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{AccessService, MediaService};
