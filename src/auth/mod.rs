pub mod guard;
pub mod password;
pub mod service;
pub mod token;

pub use service::AuthService;
pub use token::TokenIssuer;
