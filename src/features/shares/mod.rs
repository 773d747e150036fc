//! Media shares: grant a user (or every member of an organization) viewer or
//! reviewer access to a media item.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Permission | Description |
//! |--------|----------|------------|-------------|
//! | GET | `/api/media-shared/{user_id}` | self | Media shared with the caller |
//! | POST | `/api/media-shared` | owner | Share with a user or organization |
//! | GET | `/api/media/{id}/shares` | owner | Who the media is shared with |
//! | DELETE | `/api/media-shared/{share_id}` | owner | Revoke a share |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ShareService;
