//! Revoke Refresh Token Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use coursemart_app::auth::SessionsServiceError;

use crate::{
    auth::{errors::into_api_error, models::RefreshTokenRequest},
    envelope::{ApiEnvelope, ApiError, ok},
    extensions::*,
    state::State,
};

/// Revoke Refresh Token Handler
///
/// Logs out by deleting the refresh session. Unknown tokens are accepted so
/// that logging out twice is harmless.
#[endpoint(
    tags("authentications"),
    summary = "Revoke Refresh Token",
    responses(
        (status_code = StatusCode::OK, description = "Refresh token revoked"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "authentications.revoke", skip(json, depot), err)]
pub(crate) async fn handler(
    json: JsonBody<RefreshTokenRequest>,
    depot: &mut Depot,
) -> Result<Json<ApiEnvelope<bool>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    match state.app.sessions.revoke(&request.refresh_token).await {
        Ok(()) => {
            tracing::info!("revoked refresh token");

            Ok(ok(true))
        }
        Err(SessionsServiceError::NotFound) => Ok(ok(false)),
        Err(error) => Err(into_api_error(error)),
    }
}
