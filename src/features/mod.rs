pub mod annotations;
pub mod auth;
pub mod comments;
pub mod media;
pub mod org_invites;
pub mod organizations;
pub mod realtime;
pub mod shares;
pub mod system;
pub mod users;
