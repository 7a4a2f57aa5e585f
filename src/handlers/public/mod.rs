pub mod auth;
pub mod stores;
