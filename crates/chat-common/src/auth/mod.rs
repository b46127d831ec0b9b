//! Authentication utilities

mod jwt;
mod password;
mod tokens;

pub use jwt::{AccessToken, Claims, JwtService};
pub use password::{hash_password, password_strength, verify_password, PASSWORD_MAX_LEN, PASSWORD_MIN_LEN};
pub use tokens::{generate_confirmation_token, hash_refresh_token, IssuedRefreshToken};
