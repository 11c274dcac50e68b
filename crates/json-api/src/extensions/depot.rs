//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::Depot;

use coursemart_app::{auth::AccessClaims, domain::users::records::UserUuid};

use crate::envelope::ApiError;

const CLAIMS_DEPOT_KEY: &str = "access_claims";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError>;

    fn insert_claims(&mut self, claims: AccessClaims);

    /// The caller's verified access token claims.
    fn claims_or_401(&self) -> Result<&AccessClaims, ApiError>;

    /// The caller's own user uuid.
    fn current_user_or_401(&self) -> Result<UserUuid, ApiError>;

    /// Check that the caller is the addressed user.
    fn authorize_user(&self, user: UserUuid) -> Result<UserUuid, ApiError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError> {
        self.obtain::<T>()
            .map_err(|_ignored| ApiError::internal("missing depot value", &"state"))
    }

    fn insert_claims(&mut self, claims: AccessClaims) {
        self.insert(CLAIMS_DEPOT_KEY, claims);
    }

    fn claims_or_401(&self) -> Result<&AccessClaims, ApiError> {
        self.get::<AccessClaims>(CLAIMS_DEPOT_KEY)
            .map_err(|_ignored| ApiError::unauthorized("Authentication required"))
    }

    fn current_user_or_401(&self) -> Result<UserUuid, ApiError> {
        self.claims_or_401().map(AccessClaims::user)
    }

    fn authorize_user(&self, user: UserUuid) -> Result<UserUuid, ApiError> {
        let current = self.current_user_or_401()?;

        if current != user {
            tracing::warn!(
                user_uuid = %current,
                addressed_user_uuid = %user,
                "rejected access to another user's resources"
            );

            return Err(ApiError::forbidden(
                "You are not allowed to access this user's resources",
            ));
        }

        Ok(current)
    }
}
