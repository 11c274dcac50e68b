//! Refresh session repository.

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{auth::models::RefreshSession, domain::users::records::UserUuid};

const UPSERT_REFRESH_SESSION_SQL: &str = include_str!("sql/upsert_refresh_session.sql");
const FIND_REFRESH_SESSION_SQL: &str = include_str!("sql/find_refresh_session.sql");
const ROTATE_REFRESH_SESSION_SQL: &str = include_str!("sql/rotate_refresh_session.sql");
const DELETE_REFRESH_SESSION_SQL: &str = include_str!("sql/delete_refresh_session.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgSessionsRepository;

impl PgSessionsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Replace the user's session, invalidating any earlier refresh token.
    pub(crate) async fn upsert_refresh_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        query(UPSERT_REFRESH_SESSION_SQL)
            .bind(user.into_uuid())
            .bind(token_hash)
            .bind(SqlxTimestamp::from(expires_at))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn find_refresh_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, sqlx::Error> {
        query_as::<Postgres, RefreshSession>(FIND_REFRESH_SESSION_SQL)
            .bind(token_hash)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Swap `old_hash` for `new_hash` if it is still current and unexpired.
    /// Returns the owning user, or `None` when another request got there first.
    pub(crate) async fn rotate_refresh_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        old_hash: &str,
        new_hash: &str,
        expires_at: Timestamp,
    ) -> Result<Option<UserUuid>, sqlx::Error> {
        let user = query_scalar::<Postgres, Uuid>(ROTATE_REFRESH_SESSION_SQL)
            .bind(old_hash)
            .bind(new_hash)
            .bind(SqlxTimestamp::from(expires_at))
            .fetch_optional(&mut **tx)
            .await?;

        Ok(user.map(UserUuid::from_uuid))
    }

    pub(crate) async fn delete_refresh_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_REFRESH_SESSION_SQL)
            .bind(token_hash)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for RefreshSession {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
        })
    }
}
