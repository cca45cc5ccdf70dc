//! Session repository for refresh token management.
//!
//! Refresh tokens are never stored in the clear; only a SHA-256 hash lands
//! in the database.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entities::sessions;

/// Session repository for refresh token operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
}

impl SessionRepository {
    /// Creates a new session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Hashes a refresh token for storage and lookup.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        Sha256::digest(token.as_bytes())
            .iter()
            .fold(String::with_capacity(64), |mut hex, byte| {
                use std::fmt::Write;
                let _ = write!(hex, "{byte:02x}");
                hex
            })
    }

    /// Records a new session for a freshly issued refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        user_id: Uuid,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
        user_agent: Option<String>,
        ip_address: Option<String>,
    ) -> Result<sessions::Model, DbErr> {
        let now = Utc::now().into();

        let session = sessions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            refresh_token_hash: Set(Self::hash_token(refresh_token)),
            user_agent: Set(user_agent),
            ip_address: Set(ip_address),
            expires_at: Set(expires_at.into()),
            revoked_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        session.insert(&self.db).await
    }

    /// Finds the active (not revoked, not expired) session for a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_active(
        &self,
        refresh_token: &str,
    ) -> Result<Option<sessions::Model>, DbErr> {
        let hash = Self::hash_token(refresh_token);

        sessions::Entity::find()
            .filter(sessions::Column::RefreshTokenHash.eq(hash))
            .filter(sessions::Column::RevokedAt.is_null())
            .filter(sessions::Column::ExpiresAt.gt(Utc::now()))
            .one(&self.db)
            .await
    }

    /// Revokes the session holding the given refresh token.
    ///
    /// Returns `true` if a session was revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn revoke(&self, refresh_token: &str) -> Result<bool, DbErr> {
        let Some(session) = self.find_active(refresh_token).await? else {
            return Ok(false);
        };

        let now = Utc::now().into();
        let mut active: sessions::ActiveModel = session.into();
        active.revoked_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        Ok(true)
    }

    /// Revokes all active sessions for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn revoke_user_sessions(&self, user_id: Uuid) -> Result<u64, DbErr> {
        let now = Utc::now();

        let result = sessions::Entity::update_many()
            .col_expr(
                sessions::Column::RevokedAt,
                sea_orm::sea_query::Expr::value(Some::<DateTime<chrono::FixedOffset>>(now.into())),
            )
            .col_expr(
                sessions::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(DateTime::<chrono::FixedOffset>::from(now)),
            )
            .filter(sessions::Column::UserId.eq(user_id))
            .filter(sessions::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let hash = SessionRepository::hash_token("some-refresh-token");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, SessionRepository::hash_token("some-refresh-token"));
    }

    #[test]
    fn test_hash_token_differs_per_token() {
        assert_ne!(
            SessionRepository::hash_token("token-a"),
            SessionRepository::hash_token("token-b")
        );
    }
}
