//! Clear Basket Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    baskets::{
        errors::into_api_error,
        models::{BasketResponse, BasketUserQuery},
    },
    envelope::{ApiEnvelope, ApiError, ok},
    extensions::*,
    state::State,
};

/// Clear Basket Handler
#[endpoint(
    tags("baskets"),
    summary = "Clear Basket",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Basket emptied"),
        (status_code = StatusCode::BAD_REQUEST, description = "Basket is completed"),
        (status_code = StatusCode::FORBIDDEN, description = "Basket belongs to another user"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "baskets.clear",
    skip(query, depot),
    fields(user_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    query: BasketUserQuery,
    depot: &mut Depot,
) -> Result<Json<ApiEnvelope<BasketResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.authorize_user(query.user_id.into())?;

    tracing::Span::current().record("user_uuid", tracing::field::display(user));

    let basket = state
        .app
        .baskets
        .clear_basket(user)
        .await
        .map_err(into_api_error)?;

    Ok(ok(basket.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use coursemart_app::domain::baskets::{BasketError, BasketsServiceError};

    use crate::test_helpers::{Mocks, TEST_USER_UUID, make_basket, service_with};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service_with(mocks, Router::with_path("baskets/clear").delete(handler))
    }

    #[tokio::test]
    async fn test_clear_returns_empty_basket() -> TestResult {
        let basket = make_basket(TEST_USER_UUID, &[])?;

        let mut mocks = Mocks::new();

        mocks
            .baskets
            .expect_clear_basket()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(move |_| Ok(basket));

        let mut res = TestClient::delete(format!(
            "http://example.com/baskets/clear?userId={TEST_USER_UUID}"
        ))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(body["data"]["total"], json!(0));

        Ok(())
    }

    #[tokio::test]
    async fn test_clear_completed_basket_returns_400() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .baskets
            .expect_clear_basket()
            .once()
            .return_once(|_| Err(BasketsServiceError::Basket(BasketError::NotModifiable)));

        let res = TestClient::delete(format!(
            "http://example.com/baskets/clear?userId={TEST_USER_UUID}"
        ))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
