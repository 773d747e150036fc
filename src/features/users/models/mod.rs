mod user;

pub use user::{CurrentUser, User};
