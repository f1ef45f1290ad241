pub mod auth;
pub mod concerts;
pub mod images;
pub mod users;
