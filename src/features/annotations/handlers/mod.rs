mod annotation_handler;

pub use annotation_handler::*;
