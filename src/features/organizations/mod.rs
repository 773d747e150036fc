//! Organizations group collaborators under an owner. Members hold a
//! `viewer` or `reviewer` role and join through invites.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/organizations` | Organizations the caller owns or belongs to |
//! | POST | `/api/organizations` | Create organization |
//! | GET | `/api/organizations/{id}` | Organization with members |
//! | PATCH | `/api/organizations/{id}/members/{user_id}` | Change member role (owner) |
//! | DELETE | `/api/organizations/{id}/members/{user_id}` | Remove member or leave |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::OrganizationService;
