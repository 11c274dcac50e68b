//! Sessions service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;

use crate::{
    auth::{
        access::{AccessClaims, AccessTokenSigner},
        errors::SessionsServiceError,
        models::{SessionSettings, TokenPair},
        repository::PgSessionsRepository,
        token::{generate_refresh_token, parse_refresh_token},
    },
    database::Db,
    domain::users::{UserDirectory, UsersError, records::UserUuid},
};

#[derive(Clone)]
pub struct PgSessionsService {
    db: Db,
    repository: PgSessionsRepository,
    users: Arc<dyn UserDirectory>,
    signer: AccessTokenSigner,
    refresh_token_ttl: SignedDuration,
}

impl std::fmt::Debug for PgSessionsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSessionsService")
            .field("signer", &self.signer)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish_non_exhaustive()
    }
}

impl PgSessionsService {
    #[must_use]
    pub fn new(db: Db, users: Arc<dyn UserDirectory>, settings: &SessionSettings) -> Self {
        Self {
            db,
            repository: PgSessionsRepository::new(),
            users,
            signer: AccessTokenSigner::new(
                settings.jwt_secret.as_bytes(),
                settings.access_token_ttl,
            ),
            refresh_token_ttl: settings.refresh_token_ttl,
        }
    }

    async fn sign_access_token(
        &self,
        user: UserUuid,
    ) -> Result<(String, Timestamp), SessionsServiceError> {
        let record = self.users.find_by_id(user).await?;
        let roles = self.users.get_roles(user).await?;

        self.signer.issue(&record, roles)
    }
}

#[async_trait]
impl SessionsService for PgSessionsService {
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, SessionsServiceError> {
        let user = match self.users.find_by_email(email).await {
            Ok(user) => user,
            Err(UsersError::NotFound) => return Err(SessionsServiceError::InvalidCredentials),
            Err(error) => return Err(error.into()),
        };

        if !self.users.check_password(user.uuid, password).await? {
            tracing::debug!(user_uuid = %user.uuid, "password mismatch");

            return Err(SessionsServiceError::InvalidCredentials);
        }

        self.issue_token_pair(user.uuid).await
    }

    async fn issue_token_pair(&self, user: UserUuid) -> Result<TokenPair, SessionsServiceError> {
        let (access_token, access_token_expires_at) = self.sign_access_token(user).await?;

        let refresh = generate_refresh_token();
        let refresh_token_expires_at = Timestamp::now().checked_add(self.refresh_token_ttl)?;

        let mut tx = self.db.begin_unit_of_work().await?;

        self.repository
            .upsert_refresh_session(&mut tx, user, &refresh.hash(), refresh_token_expires_at)
            .await?;

        tx.commit().await?;

        tracing::info!(user_uuid = %user, "issued token pair");

        Ok(TokenPair {
            access_token,
            access_token_expires_at,
            refresh_token: refresh.format(),
            refresh_token_expires_at,
        })
    }

    async fn refresh_from_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenPair, SessionsServiceError> {
        let presented =
            parse_refresh_token(refresh_token).map_err(|_| SessionsServiceError::NotFound)?;
        let presented_hash = presented.hash();

        let mut tx = self.db.begin_unit_of_work().await?;

        let session = self
            .repository
            .find_refresh_session(&mut tx, &presented_hash)
            .await?
            .ok_or(SessionsServiceError::NotFound)?;

        if session.expires_at <= Timestamp::now() {
            return Err(SessionsServiceError::Expired);
        }

        let (access_token, access_token_expires_at) =
            self.sign_access_token(session.user).await?;

        let next = generate_refresh_token();
        let refresh_token_expires_at = Timestamp::now().checked_add(self.refresh_token_ttl)?;

        self.repository
            .rotate_refresh_session(
                &mut tx,
                &presented_hash,
                &next.hash(),
                refresh_token_expires_at,
            )
            .await?
            .ok_or(SessionsServiceError::NotFound)?;

        tx.commit().await?;

        tracing::debug!(user_uuid = %session.user, "rotated refresh token");

        Ok(TokenPair {
            access_token,
            access_token_expires_at,
            refresh_token: next.format(),
            refresh_token_expires_at,
        })
    }

    async fn revoke(&self, refresh_token: &str) -> Result<(), SessionsServiceError> {
        let presented =
            parse_refresh_token(refresh_token).map_err(|_| SessionsServiceError::NotFound)?;

        let mut tx = self.db.begin_unit_of_work().await?;

        let rows_affected = self
            .repository
            .delete_refresh_session(&mut tx, &presented.hash())
            .await?;

        if rows_affected == 0 {
            return Err(SessionsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn authenticate_bearer(
        &self,
        access_token: &str,
    ) -> Result<AccessClaims, SessionsServiceError> {
        self.signer.verify(access_token)
    }
}

#[automock]
#[async_trait]
pub trait SessionsService: Send + Sync {
    /// Check credentials and issue a fresh token pair.
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, SessionsServiceError>;

    /// Issue a token pair, replacing the user's stored refresh session.
    async fn issue_token_pair(&self, user: UserUuid) -> Result<TokenPair, SessionsServiceError>;

    /// Exchange a refresh token for a new pair. The presented token stops
    /// working as soon as this succeeds.
    async fn refresh_from_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenPair, SessionsServiceError>;

    /// Delete the refresh session identified by the token.
    async fn revoke(&self, refresh_token: &str) -> Result<(), SessionsServiceError>;

    /// Validate an access token and return its claims.
    async fn authenticate_bearer(
        &self,
        access_token: &str,
    ) -> Result<AccessClaims, SessionsServiceError>;
}
