mod invite_handler;

pub use invite_handler::*;
