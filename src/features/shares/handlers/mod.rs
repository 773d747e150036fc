mod share_handler;

pub use share_handler::*;
