pub mod concert;
pub mod session;
pub mod user;
