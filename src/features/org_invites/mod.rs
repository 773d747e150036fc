//! Invitations into organizations.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/org-invites/send` | Invite a user (organization owner) |
//! | GET | `/api/org-invites/pending/{user_id}` | Caller's pending invites |
//! | POST | `/api/org-invites/accept/{id}` | Accept and join |
//! | POST | `/api/org-invites/reject/{id}` | Reject |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::InviteService;
