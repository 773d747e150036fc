mod share;

pub use share::*;
