//! # pd-auth
//!
//! Who the caller is and what they may do.
//!
//! - [`Session`]: the authenticated caller, passed explicitly everywhere
//! - [`permissions`]: pure access predicates and visibility filters
//! - [`JwtService`]: bearer token issuance and validation
//! - [`password`]: argon2 credential hashing

pub mod jwt;
pub mod password;
pub mod permissions;
pub mod session;

pub use jwt::{extract_bearer_token, Claims, JwtError, JwtService};
pub use password::{hash_password, verify_password, PasswordError};
pub use session::Session;
