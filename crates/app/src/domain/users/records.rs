//! User Records

use crate::{audit::AuditMetadata, uuids::TypedUuid};

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// User Record
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub uuid: UserUuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub audit: AuditMetadata,
}

/// Stored credential, kept apart from [`UserRecord`] so it never leaves the
/// users module.
#[derive(Debug, Clone)]
pub(crate) struct UserCredentialRecord {
    pub user: UserRecord,
    pub password_hash: String,
}
