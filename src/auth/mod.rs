//! Bearer-token authentication: token issuing and verification, the request
//! gate for protected routes, and the register/login/validate endpoints.

mod log_in;
mod middleware;
mod register;
mod token;
mod validate;

pub use log_in::{AuthResponse, log_in};
pub use middleware::{AuthState, AuthUser, auth_guard};
pub use register::register;
pub use token::{Claims, JwtKeys, issue_token, verify_token};
pub use validate::validate;
