//! Users Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    audit::AuditMetadata,
    domain::users::records::{UserCredentialRecord, UserRecord, UserUuid},
};

const GET_USER_SQL: &str = include_str!("sql/get_user.sql");
const FIND_USER_BY_EMAIL_SQL: &str = include_str!("sql/find_user_by_email.sql");
const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const UPDATE_USER_SQL: &str = include_str!("sql/update_user.sql");
const GET_USER_ROLES_SQL: &str = include_str!("sql/get_user_roles.sql");
const ADD_USER_ROLE_SQL: &str = include_str!("sql/add_user_role.sql");

/// Column values for a new user row.
pub(crate) struct UserRow<'a> {
    pub uuid: UserUuid,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
}

/// Column values for a partial user update.
pub(crate) struct UserRowUpdate<'a> {
    pub email: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub password_hash: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgUsersRepository;

impl PgUsersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<UserCredentialRecord, sqlx::Error> {
        query_as::<Postgres, UserCredentialRecord>(GET_USER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_user_by_email(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
    ) -> Result<UserCredentialRecord, sqlx::Error> {
        query_as::<Postgres, UserCredentialRecord>(FIND_USER_BY_EMAIL_SQL)
            .bind(email)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserRow<'_>,
    ) -> Result<UserCredentialRecord, sqlx::Error> {
        query_as::<Postgres, UserCredentialRecord>(CREATE_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(user.email)
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.password_hash)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        update: UserRowUpdate<'_>,
    ) -> Result<UserCredentialRecord, sqlx::Error> {
        query_as::<Postgres, UserCredentialRecord>(UPDATE_USER_SQL)
            .bind(user.into_uuid())
            .bind(update.email)
            .bind(update.first_name)
            .bind(update.last_name)
            .bind(update.password_hash)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_user_roles(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<String>, sqlx::Error> {
        query_scalar::<Postgres, String>(GET_USER_ROLES_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn add_user_role(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        role: &str,
    ) -> Result<(), sqlx::Error> {
        query(ADD_USER_ROLE_SQL)
            .bind(user.into_uuid())
            .bind(role)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for UserCredentialRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user: UserRecord {
                uuid: UserUuid::from_uuid(row.try_get("uuid")?),
                email: row.try_get("email")?,
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                audit: AuditMetadata::from_row(row)?,
            },
            password_hash: row.try_get("password_hash")?,
        })
    }
}
