//! Refresh Token Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    auth::{
        errors::into_api_error,
        models::{RefreshTokenRequest, TokenPairResponse},
    },
    envelope::{ApiEnvelope, ApiError, ok},
    extensions::*,
    state::State,
};

/// Refresh Token Handler
///
/// Rotates a refresh token. The presented token cannot be used again.
#[endpoint(
    tags("authentications"),
    summary = "Create Token By Refresh Token",
    responses(
        (status_code = StatusCode::OK, description = "Token pair issued"),
        (status_code = StatusCode::BAD_REQUEST, description = "Refresh token unknown or expired"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "authentications.refresh", skip(json, depot), err)]
pub(crate) async fn handler(
    json: JsonBody<RefreshTokenRequest>,
    depot: &mut Depot,
) -> Result<Json<ApiEnvelope<TokenPairResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let pair = state
        .app
        .sessions
        .refresh_from_token(&request.refresh_token)
        .await
        .map_err(into_api_error)?;

    Ok(ok(pair.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use coursemart_app::{auth::SessionsServiceError, database::SqlError};

    use crate::{
        auth::handlers::tests::make_token_pair,
        test_helpers::{Mocks, anonymous_service},
    };

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        anonymous_service(
            mocks,
            Router::with_path("authentications/create-token-by-refresh-token").post(handler),
        )
    }

    #[tokio::test]
    async fn test_refresh_returns_rotated_pair() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .sessions
            .expect_refresh_from_token()
            .once()
            .withf(|token| token == "cm_rt_old")
            .return_once(|_| Ok(make_token_pair("new")));

        let mut res =
            TestClient::post("http://example.com/authentications/create-token-by-refresh-token")
                .json(&json!({ "refreshToken": "cm_rt_old" }))
                .send(&make_service(mocks))
                .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(body["data"]["refreshToken"], json!("cm_rt_new"));

        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_with_expired_token_returns_400() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .sessions
            .expect_refresh_from_token()
            .once()
            .return_once(|_| Err(SessionsServiceError::Expired));

        let mut res =
            TestClient::post("http://example.com/authentications/create-token-by-refresh-token")
                .json(&json!({ "refreshToken": "cm_rt_old" }))
                .send(&make_service(mocks))
                .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        let body: Value = res.take_json().await?;

        assert_eq!(body["errorMessage"], json!(["Refresh token has expired"]));

        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_storage_failure_hides_details() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .sessions
            .expect_refresh_from_token()
            .once()
            .return_once(|_| Err(SessionsServiceError::Sql(SqlError::PoolTimedOut)));

        let mut res =
            TestClient::post("http://example.com/authentications/create-token-by-refresh-token")
                .json(&json!({ "refreshToken": "cm_rt_old" }))
                .send(&make_service(mocks))
                .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        let body: Value = res.take_json().await?;

        assert_eq!(body["errorMessage"], json!(["An unexpected error occurred"]));

        Ok(())
    }
}
