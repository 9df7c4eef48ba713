//! The shared credential that every user logs in with.

use std::fmt::Debug;

use crate::Error;

use super::password::PasswordHash;

/// Checks a username and password at log-in.
pub trait CredentialProvider: Debug + Send + Sync {
    /// Whether `username` and `password` match the credential.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if the password could not be checked.
    fn verify(&self, username: &str, password: &str) -> Result<bool, Error>;

    /// Whether a session opened for `username` still belongs to this credential.
    ///
    /// Sessions for other usernames end, e.g. after the shared username changes.
    fn owns_session(&self, username: &str) -> bool;
}

/// A single username and password shared by everyone who uses the ledger.
///
/// The password is only held as a bcrypt hash.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedCredential {
    username: String,
    password_hash: PasswordHash,
}

impl SharedCredential {
    /// Hash `password` with `cost` and pair it with `username`.
    ///
    /// Surrounding whitespace is trimmed from both, as it is at log-in.
    ///
    /// # Errors
    ///
    /// Returns a:
    /// - [Error::MissingCredential] if `username` or `password` is empty,
    /// - or [Error::HashingError] if the password could not be hashed.
    pub fn new(username: &str, password: &str, cost: u32) -> Result<Self, Error> {
        if username.trim().is_empty() {
            return Err(Error::MissingCredential("username"));
        }

        let password = password.trim();

        if password.is_empty() {
            return Err(Error::MissingCredential("password"));
        }

        Ok(Self {
            username: username.trim().to_owned(),
            password_hash: PasswordHash::new(password, cost)?,
        })
    }

    /// The username, trimmed of surrounding whitespace.
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl CredentialProvider for SharedCredential {
    fn verify(&self, username: &str, password: &str) -> Result<bool, Error> {
        // Always check the password so a wrong username takes as long as a wrong password.
        let is_password_valid = self.password_hash.verify(password.trim())?;

        Ok(is_password_valid && username.trim() == self.username)
    }

    fn owns_session(&self, username: &str) -> bool {
        username == self.username
    }
}
