//! Shapes drawn on a media frame at a point on the timeline.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Permission | Description |
//! |--------|----------|------------|-------------|
//! | GET | `/api/annotations/{media_id}` | viewer | List annotations |
//! | POST | `/api/annotations` | reviewer | Add annotation |
//! | DELETE | `/api/annotations/{id}` | author or owner | Delete annotation |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::AnnotationService;
