//! Audit metadata embedded in every persisted entity.

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Row, postgres::PgRow};

/// Creation, modification and soft-delete timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditMetadata {
    created_at: Timestamp,
    updated_at: Timestamp,
    deleted_at: Option<Timestamp>,
}

impl AuditMetadata {
    /// Metadata for an entity created right now.
    #[must_use]
    pub fn now() -> Self {
        let now = Timestamp::now();

        Self {
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[must_use]
    pub const fn from_parts(
        created_at: Timestamp,
        updated_at: Timestamp,
        deleted_at: Option<Timestamp>,
    ) -> Self {
        Self {
            created_at,
            updated_at,
            deleted_at,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }

    /// Soft-delete. The first deletion time wins.
    pub fn mark_deleted(&mut self) {
        let now = Timestamp::now();

        self.updated_at = now;
        self.deleted_at.get_or_insert(now);
    }

    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    #[must_use]
    pub const fn deleted_at(&self) -> Option<Timestamp> {
        self.deleted_at
    }

    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Decode the `created_at`/`updated_at`/`deleted_at` columns of a row.
    pub(crate) fn from_row(row: &PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
