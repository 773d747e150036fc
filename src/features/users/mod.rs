//! Local user records mirrored from Keycloak identities.
//!
//! Every authenticated request is resolved to a row in `users` by
//! [`middleware::resolve_current_user`]; the row is created on first sight of
//! a Keycloak subject.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/me` | Current user's record |
//! | GET | `/api/users` | Lookup by `keycloak_id` or search by `search` |
//! | POST | `/api/users` | Create a user record (admin) |
//! | GET | `/api/users/{id}` | Get user by id |

pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use models::CurrentUser;
pub use services::UserService;
