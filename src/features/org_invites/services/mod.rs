mod invite_service;

pub use invite_service::InviteService;
