//! App Router

use salvo::Router;

use crate::{auth, baskets, enrollments, healthcheck, orders, payments};

/// Every API route. State and request logging hoops are added by the caller.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(
            Router::with_path("authentications")
                .push(Router::with_path("login").post(auth::login::handler))
                .push(
                    Router::with_path("create-token-by-refresh-token")
                        .post(auth::refresh::handler),
                )
                .push(Router::with_path("revoke-refresh-token").post(auth::revoke::handler)),
        )
        .push(
            Router::new()
                .hoop(auth::middleware::handler)
                .push(
                    Router::with_path("baskets")
                        .push(Router::with_path("add-course").post(baskets::add_course::handler))
                        .push(
                            Router::with_path("remove-course")
                                .delete(baskets::remove_course::handler),
                        )
                        .push(Router::with_path("clear").delete(baskets::clear::handler))
                        .push(Router::with_path("complete").patch(baskets::complete::handler))
                        .push(Router::with_path("{user}").get(baskets::get::handler)),
                )
                .push(
                    Router::with_path("orders")
                        .push(
                            Router::with_path("from-basket/{basket}")
                                .post(orders::create::handler),
                        )
                        .push(Router::with_path("user/{user}").get(orders::index::handler))
                        .push(Router::with_path("{order}").get(orders::get::handler)),
                )
                .push(
                    Router::with_path("payments")
                        .post(payments::create::handler)
                        .push(Router::with_path("{user}/user").get(payments::index::handler))
                        .push(Router::with_path("{payment}").get(payments::get::handler)),
                )
                .push(
                    Router::with_path("enrollments")
                        .post(enrollments::create::handler)
                        .delete(enrollments::delete::handler)
                        .push(
                            Router::with_path("user/{user}").get(enrollments::index::handler),
                        ),
                ),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, TEST_USER_UUID, test_claims};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        Service::new(Router::new().hoop(inject(mocks.into_state())).push(app_router()))
            .catcher(crate::envelope::catcher())
    }

    #[tokio::test]
    async fn test_healthcheck_needs_no_token() -> TestResult {
        let res = TestClient::get("http://example.com/healthcheck")
            .send(&make_service(Mocks::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_protected_route_without_token_returns_401_envelope() -> TestResult {
        let mut res = TestClient::get(format!("http://example.com/baskets/{TEST_USER_UUID}"))
            .send(&make_service(Mocks::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        let body: Value = res.take_json().await?;

        assert_eq!(body["isSuccess"], json!(false));
        assert_eq!(body["statusCode"], json!(401));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_route_returns_404_envelope() -> TestResult {
        let mut res = TestClient::get("http://example.com/wishlists")
            .send(&make_service(Mocks::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        let body: Value = res.take_json().await?;

        assert_eq!(body["isSuccess"], json!(false));
        assert_eq!(body["statusCode"], json!(404));

        Ok(())
    }

    #[tokio::test]
    async fn test_user_orders_route_is_not_shadowed_by_order_lookup() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .sessions
            .expect_authenticate_bearer()
            .once()
            .return_once(|_| Ok(test_claims()));

        mocks.orders.expect_get_order().never();
        mocks
            .orders
            .expect_list_orders()
            .once()
            .return_once(|_| Ok(Vec::new()));

        let mut res = TestClient::get(format!("http://example.com/orders/user/{TEST_USER_UUID}"))
            .add_header("authorization", "Bearer token", true)
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(body["data"], json!([]));

        Ok(())
    }

    #[tokio::test]
    async fn test_user_payments_route_is_not_shadowed_by_payment_lookup() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .sessions
            .expect_authenticate_bearer()
            .once()
            .return_once(|_| Ok(test_claims()));

        mocks.payments.expect_get_payment().never();
        mocks
            .payments
            .expect_list_payments()
            .once()
            .return_once(|_| Ok(Vec::new()));

        let res = TestClient::get(format!("http://example.com/payments/{TEST_USER_UUID}/user"))
            .add_header("authorization", "Bearer token", true)
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }
}
