//! Service banner and health probes.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/` | No | Service banner |
//! | GET | `/health` | No | Liveness |
//! | GET | `/health/db` | No | Database round-trip and realtime counters |

pub mod dtos;
pub mod handlers;
pub mod routes;

pub use handlers::SystemState;
