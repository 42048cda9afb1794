pub mod email;
pub mod jwt;
pub mod token;

pub use email::{normalize_email, validate_email};
pub use jwt::*;
pub use token::{generate_login_token, hash_token};
