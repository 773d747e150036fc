mod media;
mod permission;

pub use media::*;
pub use permission::MediaPermission;
