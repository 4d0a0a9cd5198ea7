pub mod authentication;
pub mod factory;
pub mod gate;
pub mod identity;
pub mod jwt;
pub mod password;

pub use authentication::AuthenticationService;
pub use gate::{RequestGate, SecurityContext};
pub use jwt::TokenCodec;
