//! Credential container with automatic memory zeroing.

use zeroize::{Zeroize, Zeroizing};

/// Database credentials, cleared from memory on drop.
///
/// The password is never printed by `Debug`.
///
/// # Example
///
/// ```rust
/// use pgscan_core::security::Credentials;
///
/// let creds = Credentials::new("scanner".to_string(), Some("secret".to_string()));
/// assert_eq!(creds.username(), "scanner");
/// assert!(creds.has_password());
/// assert!(!format!("{:?}", creds).contains("secret"));
/// ```
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<Option<String>>,
}

impl Credentials {
    /// Creates new credentials.
    pub fn new(username: String, password: Option<String>) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    /// Database role name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password, only for handing to the driver.
    pub(crate) fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Checks if a password is present without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username())
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}
