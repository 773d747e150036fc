mod access_service;
mod media_service;

pub use access_service::{check_permission, AccessService};
pub use media_service::{MediaService, NewMedia};
