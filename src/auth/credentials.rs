use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "kukuconnect";

/// Secure OS-level storage for a user's login password.
///
/// Kept so the client can re-authenticate silently when the refresh token
/// dies, instead of forcing the user back through the login form. One
/// keychain entry per username under the `kukuconnect` service.
pub struct CredentialStore {
    username: String,
}

impl CredentialStore {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.username).context("Failed to create keyring entry")
    }

    /// Save the password in the OS keychain.
    pub fn save_password(&self, password: &str) -> Result<()> {
        self.entry()?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    /// Look up the saved password. `Ok(None)` when nothing is stored.
    pub fn password(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(password) => Ok(Some(password)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve password from keychain"),
        }
    }

    /// Remove the saved password, if any.
    pub fn forget(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        }
    }
}
