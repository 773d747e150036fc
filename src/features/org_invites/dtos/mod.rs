mod invite_dto;

pub use invite_dto::*;
