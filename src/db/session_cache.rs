//! Durable storage for the credential pair and cached profile.
//!
//! Two wholesale-JSON rows keyed by name. Reads treat a missing or
//! unparseable row as absence so a corrupt cache can never wedge startup;
//! `clear` removes both rows in one transaction so no partial state is
//! observable afterwards.

use sqlx::sqlite::SqlitePool;
use tracing::warn;

use crate::gateway::{CredentialPair, UserProfile};

const CREDENTIALS_KEY: &str = "credentials";
const PROFILE_KEY: &str = "profile";

/// Store for the locally persisted session state.
pub struct SessionCacheStore {
    pool: SqlitePool,
}

impl SessionCacheStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist the credential pair, replacing any prior value.
    pub async fn save_credentials(&self, pair: &CredentialPair) -> Result<(), sqlx::Error> {
        let json = serde_json::to_string(pair).expect("credential pair serializes");
        self.put(CREDENTIALS_KEY, &json).await
    }

    /// Load the previously saved pair. Missing or corrupt rows read as `None`.
    pub async fn load_credentials(&self) -> Result<Option<CredentialPair>, sqlx::Error> {
        Ok(self.get(CREDENTIALS_KEY).await?.and_then(|json| {
            serde_json::from_str(&json)
                .map_err(|e| warn!(error = %e, "Discarding corrupt stored credentials"))
                .ok()
        }))
    }

    /// Persist the cached profile, replacing any prior value.
    pub async fn save_profile(&self, profile: &UserProfile) -> Result<(), sqlx::Error> {
        let json = serde_json::to_string(profile).expect("profile serializes");
        self.put(PROFILE_KEY, &json).await
    }

    /// Load the cached profile. Missing or corrupt rows read as `None`.
    pub async fn load_profile(&self) -> Result<Option<UserProfile>, sqlx::Error> {
        Ok(self.get(PROFILE_KEY).await?.and_then(|json| {
            serde_json::from_str(&json)
                .map_err(|e| warn!(error = %e, "Discarding corrupt stored profile"))
                .ok()
        }))
    }

    /// Remove both the pair and the profile atomically.
    pub async fn clear(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for key in [CREDENTIALS_KEY, PROFILE_KEY] {
            sqlx::query("DELETE FROM session_cache WHERE key = ?")
                .bind(key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO session_cache (key, value, updated_at) VALUES (?, ?, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM session_cache WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn pair(access: &str, refresh: &str) -> CredentialPair {
        CredentialPair {
            access_token: access.into(),
            refresh_token: refresh.into(),
        }
    }

    fn profile(email: &str) -> UserProfile {
        UserProfile {
            id: "1".into(),
            fullname: "A B".into(),
            email: email.into(),
            phone: None,
            balance: 0,
            is_admin: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_save_replaces_wholesale() {
        let db = Database::open(":memory:").await.unwrap();
        let store = db.session_cache();

        store.save_credentials(&pair("AT1", "RT1")).await.unwrap();
        store.save_credentials(&pair("AT2", "RT2")).await.unwrap();

        let loaded = store.load_credentials().await.unwrap().unwrap();
        assert_eq!(loaded, pair("AT2", "RT2"));
    }

    #[tokio::test]
    async fn test_missing_reads_as_none() {
        let db = Database::open(":memory:").await.unwrap();
        let store = db.session_cache();

        assert!(store.load_credentials().await.unwrap().is_none());
        assert!(store.load_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_row_reads_as_none() {
        let db = Database::open(":memory:").await.unwrap();
        let store = db.session_cache();

        sqlx::query("INSERT INTO session_cache (key, value) VALUES ('credentials', 'not json')")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(store.load_credentials().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_both() {
        let db = Database::open(":memory:").await.unwrap();
        let store = db.session_cache();

        store.save_credentials(&pair("AT1", "RT1")).await.unwrap();
        store.save_profile(&profile("a@b.com")).await.unwrap();
        store.clear().await.unwrap();

        assert!(store.load_credentials().await.unwrap().is_none());
        assert!(store.load_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_when_empty_is_fine() {
        let db = Database::open(":memory:").await.unwrap();
        db.session_cache().clear().await.unwrap();
    }
}
