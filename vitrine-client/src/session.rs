//! Persisted login state
//!
//! The session file is a flat JSON object of string values, like browser
//! local storage: the access token under [`TOKEN_KEY`] and the serialised
//! user under [`USER_KEY`]. Other keys in the file are preserved.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use vitrine_shared::models::user::PublicUser;

use crate::error::ClientError;

pub const TOKEN_KEY: &str = "vitrine.token";
pub const USER_KEY: &str = "vitrine.user";

/// A logged-in user and their access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored session
    ///
    /// A missing file, a missing key or an unreadable user all mean "logged
    /// out"; only I/O failures are errors.
    pub async fn load(&self) -> Result<Option<Session>, ClientError> {
        let entries = self.read_entries().await?;

        let token = entries.get(TOKEN_KEY).and_then(Value::as_str);
        let user = entries.get(USER_KEY).and_then(Value::as_str);

        let (Some(token), Some(user)) = (token, user) else {
            return Ok(None);
        };

        match serde_json::from_str::<PublicUser>(user) {
            Ok(user) => Ok(Some(Session {
                token: token.to_string(),
                user,
            })),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding unreadable stored user");
                Ok(None)
            }
        }
    }

    pub async fn save(&self, session: &Session) -> Result<(), ClientError> {
        let mut entries = self.read_entries().await?;
        entries.insert(TOKEN_KEY.to_string(), Value::String(session.token.clone()));
        entries.insert(
            USER_KEY.to_string(),
            Value::String(serde_json::to_string(&session.user)?),
        );

        self.write_entries(&entries).await
    }

    /// Removes both keys; a missing file is already clear
    pub async fn clear(&self) -> Result<(), ClientError> {
        let mut entries = self.read_entries().await?;
        let had_token = entries.remove(TOKEN_KEY).is_some();
        let had_user = entries.remove(USER_KEY).is_some();

        if had_token || had_user {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }

    async fn read_entries(&self) -> Result<Map<String, Value>, ClientError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Object(entries)) => Ok(entries),
            _ => {
                tracing::warn!(path = %self.path.display(), "Session file is not a JSON object, starting empty");
                Ok(Map::new())
            }
        }
    }

    /// Writes through a temporary file so a crash never leaves half a session
    async fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), ClientError> {
        let data = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");

        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};
    use vitrine_shared::models::user::UserRole;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("vitrine-session-{name}-{nanos}.json"))
    }

    fn session() -> Session {
        Session {
            token: "eyJ.token".to_string(),
            user: PublicUser {
                id: 7,
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                role: UserRole::User,
                avatar: None,
                created_at: chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            },
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_logged_out() {
        let store = SessionStore::new(temp_path("missing"));
        assert_eq!(store.load().await.unwrap(), None);
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let path = temp_path("cycle");
        let store = SessionStore::new(&path);

        store.save(&session()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session()));

        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw[TOKEN_KEY], "eyJ.token");
        assert!(raw[USER_KEY].as_str().unwrap().contains("ana@example.com"));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_other_keys_survive() {
        let path = temp_path("shared");
        std::fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = SessionStore::new(&path);
        store.save(&session()).await.unwrap();
        store.clear().await.unwrap();

        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({ "theme": "dark" }));

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_corrupt_user_reads_as_logged_out() {
        let path = temp_path("corrupt");
        std::fs::write(&path, r#"{"vitrine.token": "abc", "vitrine.user": "{not json"}"#).unwrap();

        let store = SessionStore::new(&path);
        assert_eq!(store.load().await.unwrap(), None);

        std::fs::remove_file(path).ok();
    }
}
