//! Password hashing and session tokens.

mod error;
mod jwt;
mod password;

pub use error::{CryptError, CryptResult};
pub use jwt::{UserClaims, generate_token, process_token};
pub use password::{hash_password, verify_password};
