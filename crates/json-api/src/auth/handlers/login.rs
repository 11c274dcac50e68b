//! Login Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    auth::{errors::into_api_error, models::{LoginRequest, TokenPairResponse}},
    envelope::{ApiEnvelope, ApiError, ok},
    extensions::*,
    state::State,
};

/// Login Handler
///
/// Exchanges email and password for an access and refresh token pair.
#[endpoint(
    tags("authentications"),
    summary = "Log In",
    responses(
        (status_code = StatusCode::OK, description = "Token pair issued"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid email or password"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "authentications.login", skip(json, depot), err)]
pub(crate) async fn handler(
    json: JsonBody<LoginRequest>,
    depot: &mut Depot,
) -> Result<Json<ApiEnvelope<TokenPairResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let pair = state
        .app
        .sessions
        .login(&request.email, &request.password)
        .await
        .map_err(into_api_error)?;

    Ok(ok(pair.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use coursemart_app::auth::SessionsServiceError;

    use crate::{
        auth::handlers::tests::make_token_pair,
        test_helpers::{Mocks, anonymous_service},
    };

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        anonymous_service(mocks, Router::with_path("authentications/login").post(handler))
    }

    #[tokio::test]
    async fn test_login_returns_token_pair() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .sessions
            .expect_login()
            .once()
            .withf(|email, password| email == "ada@example.com" && password == "hunter22")
            .return_once(|_, _| Ok(make_token_pair("one")));

        let mut res = TestClient::post("http://example.com/authentications/login")
            .json(&json!({ "email": "ada@example.com", "password": "hunter22" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(body["isSuccess"], json!(true));
        assert_eq!(body["data"]["accessToken"], json!("access-one"));
        assert_eq!(body["data"]["refreshToken"], json!("cm_rt_one"));
        assert_eq!(body["data"]["accessExpiry"], json!("1970-01-01T00:00:00Z"));

        Ok(())
    }

    #[tokio::test]
    async fn test_login_with_bad_credentials_returns_400() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .sessions
            .expect_login()
            .once()
            .return_once(|_, _| Err(SessionsServiceError::InvalidCredentials));

        let mut res = TestClient::post("http://example.com/authentications/login")
            .json(&json!({ "email": "ada@example.com", "password": "nope" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        let body: Value = res.take_json().await?;

        assert_eq!(body["isSuccess"], json!(false));
        assert_eq!(body["errorMessage"], json!(["Invalid email or password"]));

        Ok(())
    }
}
