use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Temp file written before the atomic rename into place
const SESSION_TEMP_FILE: &str = "session.json.tmp";

/// Authorization tier carried by a session.
///
/// Determines which routes are reachable: farmers get the dashboard and
/// their own product listings, buyers get the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Farmer,
    #[default]
    Buyer,
}

impl Role {
    /// Parse a role string from the server. Unknown values fall back to
    /// `Buyer`, matching the login contract.
    pub fn parse(s: &str) -> Self {
        match s {
            "farmer" => Role::Farmer,
            _ => Role::Buyer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Buyer => "buyer",
        }
    }
}

/// The credential triple plus bookkeeping, created on successful login.
///
/// All fields live and die together: a successful silent refresh replaces
/// only `access_token` in place; logout or a rejected refresh destroys the
/// whole record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub access_token: String,
    pub refresh_token: String,
    pub role: Role,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(access_token: String, refresh_token: String, role: Role, username: String) -> Self {
        Self {
            access_token,
            refresh_token,
            role,
            username,
            created_at: Utc::now(),
        }
    }
}

/// Lifecycle state of the logical session.
///
/// `Anonymous` is both the initial state and where a failed refresh or a
/// logout lands. `Refreshing` is only entered from `Authenticated`, on the
/// first 401 seen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
    Refreshing,
}

impl SessionState {
    /// Transition taken on a 401 response to a not-yet-retried request.
    pub fn begin_refresh(self) -> SessionState {
        match self {
            SessionState::Authenticated => SessionState::Refreshing,
            other => other,
        }
    }

    /// Transition taken when the refresh call completes. Success swaps the
    /// access token in place; failure clears the session entirely.
    pub fn finish_refresh(self, success: bool) -> SessionState {
        match self {
            SessionState::Refreshing if success => SessionState::Authenticated,
            SessionState::Refreshing => SessionState::Anonymous,
            other => other,
        }
    }
}

/// Persists the session as a single JSON record.
///
/// One atomically-written file (temp file + rename) instead of independent
/// per-field entries, so a crash mid-write can never leave a partial
/// credential triple on disk.
pub struct SessionStore {
    cache_dir: PathBuf,
}

impl SessionStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Load the persisted session, if any.
    pub fn load(&self) -> Result<Option<SessionData>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .context("Failed to read session file")?;
        let data: SessionData = serde_json::from_str(&contents)
            .context("Failed to parse session file")?;
        Ok(Some(data))
    }

    /// Save the session atomically.
    pub fn save(&self, data: &SessionData) -> Result<()> {
        std::fs::create_dir_all(&self.cache_dir)
            .context("Failed to create session directory")?;
        let temp = self.cache_dir.join(SESSION_TEMP_FILE);
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&temp, contents).context("Failed to write session file")?;
        std::fs::rename(&temp, self.session_path())
            .context("Failed to move session file into place")?;
        Ok(())
    }

    /// Remove the persisted session.
    pub fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_defaults_to_buyer() {
        assert_eq!(Role::parse("farmer"), Role::Farmer);
        assert_eq!(Role::parse("buyer"), Role::Buyer);
        assert_eq!(Role::parse("admin"), Role::Buyer);
        assert_eq!(Role::parse(""), Role::Buyer);
    }

    #[test]
    fn refresh_only_starts_from_authenticated() {
        assert_eq!(
            SessionState::Authenticated.begin_refresh(),
            SessionState::Refreshing
        );
        assert_eq!(SessionState::Anonymous.begin_refresh(), SessionState::Anonymous);
        assert_eq!(
            SessionState::Refreshing.begin_refresh(),
            SessionState::Refreshing
        );
    }

    #[test]
    fn refresh_outcome_transitions() {
        assert_eq!(
            SessionState::Refreshing.finish_refresh(true),
            SessionState::Authenticated
        );
        assert_eq!(
            SessionState::Refreshing.finish_refresh(false),
            SessionState::Anonymous
        );
        // No-op outside the refreshing state
        assert_eq!(
            SessionState::Authenticated.finish_refresh(false),
            SessionState::Authenticated
        );
    }

    #[test]
    fn store_saves_and_clears_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());

        assert!(store.load().unwrap().is_none());

        let data = SessionData::new(
            "A1".to_string(),
            "R1".to_string(),
            Role::Farmer,
            "alice".to_string(),
        );
        store.save(&data).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "A1");
        assert_eq!(loaded.refresh_token, "R1");
        assert_eq!(loaded.role, Role::Farmer);

        // No temp file is left behind after the rename
        assert!(!dir.path().join(SESSION_TEMP_FILE).exists());

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
