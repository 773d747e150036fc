//! Timeline comments on media items.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Permission | Description |
//! |--------|----------|------------|-------------|
//! | GET | `/api/comments/{media_id}` | viewer | List comments |
//! | POST | `/api/comments` | reviewer | Add comment |
//! | PATCH | `/api/comments/{id}` | author | Edit comment |
//! | DELETE | `/api/comments/{id}` | author or owner | Delete comment |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CommentService;
