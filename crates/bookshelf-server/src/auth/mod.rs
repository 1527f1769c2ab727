//! Admin authentication primitives
//!
//! - `password`: argon2 hashing and verification
//! - `jwt`: signed, expiring admin session tokens

pub mod jwt;
pub mod password;

pub use jwt::{AuthKeys, Claims, TokenError};

/// Role carried by catalog administrators
pub const ADMIN_ROLE: &str = "admin";
