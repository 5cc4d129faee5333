//! Server-side demo session records.
//!
//! A demo session is a lightweight fallback identity the middleware
//! consults when a request carries no usable bearer token. Records are
//! TTL-bounded and purged by the cleanup scheduler.

use sqlx::sqlite::SqlitePool;

/// A demo session record.
#[derive(Debug, Clone)]
pub struct DemoSession {
    pub id: i64,
    pub token: String,
    /// The embedded identity, stored as the profile's JSON.
    pub identity_json: String,
    pub created_at: String,
    pub expires_at: String,
}

#[derive(sqlx::FromRow)]
struct DemoSessionRow {
    id: i64,
    token: String,
    identity_json: String,
    created_at: String,
    expires_at: String,
}

impl From<DemoSessionRow> for DemoSession {
    fn from(row: DemoSessionRow) -> Self {
        Self {
            id: row.id,
            token: row.token,
            identity_json: row.identity_json,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// Store for managing demo sessions.
pub struct DemoSessionStore {
    pool: SqlitePool,
}

impl DemoSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a demo session expiring after `ttl_minutes`. Returns the row ID.
    pub async fn create(
        &self,
        token: &str,
        identity_json: &str,
        ttl_minutes: i64,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO demo_sessions (token, identity_json, expires_at)
             VALUES (?, ?, datetime('now', ?))",
        )
        .bind(token)
        .bind(identity_json)
        .bind(format!("{:+} minutes", ttl_minutes))
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a demo session by token if it has not expired.
    pub async fn get_active(&self, token: &str) -> Result<Option<DemoSession>, sqlx::Error> {
        let row: Option<DemoSessionRow> = sqlx::query_as(
            "SELECT id, token, identity_json, created_at, expires_at
             FROM demo_sessions WHERE token = ? AND expires_at >= datetime('now')",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(DemoSession::from))
    }

    /// Delete a demo session by token.
    pub async fn delete(&self, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM demo_sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all expired demo sessions.
    pub async fn cleanup_expired(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM demo_sessions WHERE expires_at < datetime('now')")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
