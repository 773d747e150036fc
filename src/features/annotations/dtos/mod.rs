mod annotation_dto;

pub use annotation_dto::*;
