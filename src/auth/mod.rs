//! Log-in sessions for the single shared credential.
//!
//! A successful log-in stores a [Token] in an encrypted cookie, which the
//! middleware checks on every protected route.

mod cookie;
mod credentials;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod token;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use credentials::{CredentialProvider, SharedCredential};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::PasswordHash;
pub(crate) use token::Token;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
