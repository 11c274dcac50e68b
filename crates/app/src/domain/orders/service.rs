//! Orders service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        baskets::{PgBasketItemsRepository, PgBasketsRepository, models::BasketUuid},
        orders::{
            errors::OrdersServiceError,
            models::{Order, OrderDetails, OrderStatus, OrderUuid},
            repository::PgOrdersRepository,
        },
        payments::{PgPaymentsRepository, models::PaymentStatus},
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    repository: PgOrdersRepository,
    baskets_repository: PgBasketsRepository,
    basket_items_repository: PgBasketItemsRepository,
    payments_repository: PgPaymentsRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
            baskets_repository: PgBasketsRepository::new(),
            basket_items_repository: PgBasketItemsRepository::new(),
            payments_repository: PgPaymentsRepository::new(),
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn create_from_basket(
        &self,
        user: UserUuid,
        basket: BasketUuid,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let header = self
            .baskets_repository
            .get_basket(&mut tx, basket)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => OrdersServiceError::BasketNotFound,
                other => other.into(),
            })?;

        if header.user != user {
            return Err(OrdersServiceError::BasketNotFound);
        }

        let items = self
            .basket_items_repository
            .get_basket_items(&mut tx, basket)
            .await?;

        let mut basket = header.with_items(items);

        let order = Order::from_basket(OrderUuid::new(), &basket)?;

        self.repository.create_order(&mut tx, &order).await?;

        basket.retire();

        self.baskets_repository
            .retire_basket(&mut tx, basket.uuid())
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_uuid = %order.uuid(),
            basket_uuid = %basket.uuid(),
            user_uuid = %user,
            total = order.total(),
            "created order from basket"
        );

        Ok(order)
    }

    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderDetails, OrdersServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let order = self.repository.get_order(&mut tx, order).await?;

        if order.user() != user {
            return Err(OrdersServiceError::NotFound);
        }

        let purchaser = self.repository.get_purchaser(&mut tx, user).await?;

        tx.commit().await?;

        Ok(OrderDetails { order, purchaser })
    }

    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let orders = self.repository.list_orders(&mut tx, user, None).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn list_completed_orders(&self, user: UserUuid) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let orders = self
            .repository
            .list_orders(&mut tx, user, Some(OrderStatus::Completed))
            .await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn complete_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let mut order = self.repository.lock_order(&mut tx, order).await?;

        if order.user() != user {
            return Err(OrdersServiceError::NotFound);
        }

        if order.mark_completed()? {
            self.repository
                .update_order_status(&mut tx, order.uuid(), order.status())
                .await?;
        }

        tx.commit().await?;

        Ok(order)
    }

    async fn cancel_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let mut order = self.repository.lock_order(&mut tx, order).await?;

        if order.user() != user {
            return Err(OrdersServiceError::NotFound);
        }

        let payment = self
            .payments_repository
            .find_payment_by_order(&mut tx, order.uuid())
            .await?;

        if payment.is_some_and(|payment| payment.status() != PaymentStatus::Failed) {
            return Err(OrdersServiceError::PaymentActive);
        }

        if order.mark_canceled()? {
            self.repository
                .update_order_status(&mut tx, order.uuid(), order.status())
                .await?;

            tracing::info!(order_uuid = %order.uuid(), "canceled order");
        }

        tx.commit().await?;

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Freeze the user's basket into a pending order and retire the basket,
    /// atomically.
    async fn create_from_basket(
        &self,
        user: UserUuid,
        basket: BasketUuid,
    ) -> Result<Order, OrdersServiceError>;

    /// One order with its items and purchaser. Orders owned by someone else
    /// are reported as not found.
    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderDetails, OrdersServiceError>;

    /// All of the user's orders, newest first.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, OrdersServiceError>;

    /// The user's completed orders, newest first.
    async fn list_completed_orders(&self, user: UserUuid) -> Result<Vec<Order>, OrdersServiceError>;

    async fn complete_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError>;

    /// Cancel a pending order. Refused while a payment for it is pending or
    /// has succeeded.
    async fn cancel_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            baskets::BasketsService, courses::CoursesService, orders::errors::OrderError,
        },
        test::TestContext,
    };

    use super::*;

    #[tokio::test]
    async fn create_from_basket_snapshots_prices_and_retires_basket() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;
        let course = ctx.create_course(50_00).await;

        let basket = ctx.baskets.add_course(user.uuid, course.uuid).await?;

        let order = ctx.orders.create_from_basket(user.uuid, basket.uuid()).await?;

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.basket(), basket.uuid());
        assert_eq!(order.total(), 50_00);

        assert!(ctx.baskets.get_active_basket(user.uuid).await?.is_none());

        ctx.courses.reprice_course(course.uuid, 99_00).await?;

        let details = ctx.orders.get_order(user.uuid, order.uuid()).await?;

        assert_eq!(details.order.items()[0].price, 50_00);
        assert_eq!(details.order.total(), 50_00);
        assert_eq!(details.purchaser.uuid, user.uuid);
        assert_eq!(details.purchaser.email, user.email);

        Ok(())
    }

    #[tokio::test]
    async fn next_mutation_after_checkout_starts_a_new_basket() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;
        let course = ctx.create_course(10_00).await;

        let first = ctx.baskets.add_course(user.uuid, course.uuid).await?;

        ctx.orders.create_from_basket(user.uuid, first.uuid()).await?;

        let second = ctx.baskets.add_course(user.uuid, course.uuid).await?;

        assert_ne!(second.uuid(), first.uuid());
        assert_eq!(second.items().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn create_from_empty_basket_fails_and_keeps_basket() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;
        let course = ctx.create_course(10_00).await;

        ctx.baskets.add_course(user.uuid, course.uuid).await?;

        let basket = ctx.baskets.clear_basket(user.uuid).await?;

        let result = ctx.orders.create_from_basket(user.uuid, basket.uuid()).await;

        assert!(
            matches!(result, Err(OrdersServiceError::Order(OrderError::EmptyBasket))),
            "expected EmptyBasket, got {result:?}"
        );
        assert!(ctx.baskets.get_active_basket(user.uuid).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn create_from_someone_elses_basket_returns_basket_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = ctx.create_user().await;
        let intruder = ctx.create_user().await;
        let course = ctx.create_course(10_00).await;

        let basket = ctx.baskets.add_course(owner.uuid, course.uuid).await?;

        let result = ctx
            .orders
            .create_from_basket(intruder.uuid, basket.uuid())
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::BasketNotFound)),
            "expected BasketNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn retired_basket_cannot_be_ordered_twice() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;
        let course = ctx.create_course(10_00).await;

        let basket = ctx.baskets.add_course(user.uuid, course.uuid).await?;

        ctx.orders.create_from_basket(user.uuid, basket.uuid()).await?;

        let result = ctx.orders.create_from_basket(user.uuid, basket.uuid()).await;

        assert!(
            matches!(result, Err(OrdersServiceError::BasketNotFound)),
            "expected BasketNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_orders_is_newest_first_and_filters_completed() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;

        let older = ctx.place_order(user.uuid, &[10_00]).await;
        let newer = ctx.place_order(user.uuid, &[20_00]).await;

        ctx.orders.complete_order(user.uuid, older.uuid()).await?;

        let all: Vec<_> = ctx
            .orders
            .list_orders(user.uuid)
            .await?
            .iter()
            .map(Order::uuid)
            .collect();

        assert_eq!(all, vec![newer.uuid(), older.uuid()]);

        let completed = ctx.orders.list_completed_orders(user.uuid).await?;

        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].uuid(), older.uuid());
        assert_eq!(completed[0].items().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn complete_then_cancel_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;
        let order = ctx.place_order(user.uuid, &[10_00]).await;

        let completed = ctx.orders.complete_order(user.uuid, order.uuid()).await?;
        let again = ctx.orders.complete_order(user.uuid, order.uuid()).await?;

        assert_eq!(completed.status(), OrderStatus::Completed);
        assert_eq!(again.status(), OrderStatus::Completed);

        let result = ctx.orders.cancel_order(user.uuid, order.uuid()).await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::Order(OrderError::InvalidTransition { .. }))
            ),
            "expected InvalidTransition, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_order_of_another_user_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = ctx.create_user().await;
        let other = ctx.create_user().await;
        let order = ctx.place_order(owner.uuid, &[10_00]).await;

        let result = ctx.orders.get_order(other.uuid, order.uuid()).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }
}
