mod invite;

pub use invite::*;
