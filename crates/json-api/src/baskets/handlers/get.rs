//! Get Basket Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    baskets::{errors::into_api_error, models::BasketResponse},
    envelope::{ApiEnvelope, ApiError, empty, ok},
    extensions::*,
    state::State,
};

/// Get Basket Handler
///
/// Returns the user's current basket, or `data: null` when there is none.
/// Reading never creates a basket.
#[endpoint(
    tags("baskets"),
    summary = "Get Basket",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Current basket or null"),
        (status_code = StatusCode::FORBIDDEN, description = "Basket belongs to another user"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "baskets.get",
    skip(user, depot),
    fields(user_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ApiEnvelope<BasketResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.authorize_user(user.into_inner().into())?;

    tracing::Span::current().record("user_uuid", tracing::field::display(user));

    let basket = state
        .app
        .baskets
        .get_active_basket(user)
        .await
        .map_err(into_api_error)?;

    Ok(match basket {
        Some(basket) => ok(basket.into()),
        None => empty(),
    })
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use coursemart_app::{
        database::SqlError,
        domain::{baskets::BasketsServiceError, users::records::UserUuid},
    };

    use crate::test_helpers::{Mocks, TEST_USER_UUID, make_basket, service_with};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service_with(mocks, Router::with_path("baskets/{user}").get(handler))
    }

    #[tokio::test]
    async fn test_get_returns_basket_with_items() -> TestResult {
        let basket = make_basket(TEST_USER_UUID, &[50_00, 25_00])?;
        let basket_uuid = basket.uuid();

        let mut mocks = Mocks::new();

        mocks
            .baskets
            .expect_get_active_basket()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(move |_| Ok(Some(basket)));

        let mut res = TestClient::get(format!("http://example.com/baskets/{TEST_USER_UUID}"))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(body["isSuccess"], json!(true));
        assert_eq!(body["data"]["id"], json!(basket_uuid.to_string()));
        assert_eq!(body["data"]["status"], json!("active"));
        assert_eq!(body["data"]["total"], json!(75_00));
        assert_eq!(body["data"]["items"][0]["price"], json!(50_00));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_without_basket_returns_null_data() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .baskets
            .expect_get_active_basket()
            .once()
            .return_once(|_| Ok(None));

        let mut res = TestClient::get(format!("http://example.com/baskets/{TEST_USER_UUID}"))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(body["isSuccess"], json!(true));
        assert_eq!(body["data"], Value::Null);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_other_users_basket_returns_403() -> TestResult {
        let mut mocks = Mocks::new();

        mocks.baskets.expect_get_active_basket().never();

        let other = UserUuid::new();

        let res = TestClient::get(format!("http://example.com/baskets/{other}"))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_storage_error_returns_500() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .baskets
            .expect_get_active_basket()
            .once()
            .return_once(|_| Err(BasketsServiceError::Sql(SqlError::PoolTimedOut)));

        let res = TestClient::get(format!("http://example.com/baskets/{TEST_USER_UUID}"))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }
}
