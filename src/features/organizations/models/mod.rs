mod organization;

pub use organization::*;
