//! User directory.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::users::{
        data::{NewUser, UserUpdate},
        errors::UsersError,
        password::{hash_password, verify_password},
        records::{UserRecord, UserUuid},
        repository::{PgUsersRepository, UserRow, UserRowUpdate},
    },
};

#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    db: Db,
    repository: PgUsersRepository,
}

impl PgUserDirectory {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_id(&self, user: UserUuid) -> Result<UserRecord, UsersError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let record = self.repository.get_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(record.user)
    }

    async fn find_by_email(&self, email: &str) -> Result<UserRecord, UsersError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let record = self.repository.find_user_by_email(&mut tx, email).await?;

        tx.commit().await?;

        Ok(record.user)
    }

    async fn check_password(&self, user: UserUuid, password: &str) -> Result<bool, UsersError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let record = self.repository.get_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(verify_password(password, &record.password_hash)?)
    }

    async fn get_roles(&self, user: UserUuid) -> Result<Vec<String>, UsersError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        // Distinguish "no roles" from "no such user".
        self.repository.get_user(&mut tx, user).await?;

        let roles = self.repository.get_user_roles(&mut tx, user).await?;

        tx.commit().await?;

        Ok(roles)
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, UsersError> {
        if user.email.trim().is_empty() || user.password.is_empty() {
            return Err(UsersError::InvalidData);
        }

        let password_hash = hash_password(&user.password)?;

        let mut tx = self.db.begin_unit_of_work().await?;

        let created = self
            .repository
            .create_user(
                &mut tx,
                UserRow {
                    uuid: user.uuid,
                    email: user.email.trim(),
                    first_name: &user.first_name,
                    last_name: &user.last_name,
                    password_hash: &password_hash,
                },
            )
            .await?;

        for role in &user.roles {
            self.repository
                .add_user_role(&mut tx, created.user.uuid, role)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(user_uuid = %created.user.uuid, "created user");

        Ok(created.user)
    }

    async fn update(&self, user: UserUuid, update: UserUpdate) -> Result<UserRecord, UsersError> {
        let password_hash = update.password.as_deref().map(hash_password).transpose()?;

        let mut tx = self.db.begin_unit_of_work().await?;

        let updated = self
            .repository
            .update_user(
                &mut tx,
                user,
                UserRowUpdate {
                    email: update.email.as_deref().map(str::trim),
                    first_name: update.first_name.as_deref(),
                    last_name: update.last_name.as_deref(),
                    password_hash: password_hash.as_deref(),
                },
            )
            .await?;

        tx.commit().await?;

        Ok(updated.user)
    }
}

/// Read-mostly view of user identity used by the session flow.
#[automock]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look a user up by identifier.
    async fn find_by_id(&self, user: UserUuid) -> Result<UserRecord, UsersError>;

    /// Look a user up by email address (case-insensitive).
    async fn find_by_email(&self, email: &str) -> Result<UserRecord, UsersError>;

    /// Returns `Ok(false)` when the password does not match.
    async fn check_password(&self, user: UserUuid, password: &str) -> Result<bool, UsersError>;

    /// Role names granted to the user.
    async fn get_roles(&self, user: UserUuid) -> Result<Vec<String>, UsersError>;

    /// Register a user with the given roles.
    async fn create(&self, user: NewUser) -> Result<UserRecord, UsersError>;

    /// Apply a partial profile update.
    async fn update(&self, user: UserUuid, update: UserUpdate) -> Result<UserRecord, UsersError>;
}
