//! Order aggregate.

use std::{fmt, str::FromStr};

use crate::{
    audit::AuditMetadata,
    domain::{
        baskets::models::{Basket, BasketUuid},
        courses::records::CourseUuid,
        orders::errors::OrderError,
        users::records::UserUuid,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Completed,
    Canceled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "canceled" => Ok(Self::Canceled),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

/// A purchased course with its price frozen at order creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderItem {
    pub course: CourseUuid,
    pub price: u64,
}

/// Identity details of the user who placed an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchaser {
    pub uuid: UserUuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Purchaser {
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// An order together with its purchaser.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: Order,
    pub purchaser: Purchaser,
}

/// Immutable snapshot of a basket at checkout.
#[derive(Debug, Clone)]
pub struct Order {
    uuid: OrderUuid,
    user: UserUuid,
    basket: BasketUuid,
    status: OrderStatus,
    items: Vec<OrderItem>,
    audit: AuditMetadata,
}

impl Order {
    /// Snapshot a basket's items and prices into a pending order.
    ///
    /// # Errors
    ///
    /// Fails when the basket has no items or lists a course more than once.
    pub fn from_basket(uuid: OrderUuid, basket: &Basket) -> Result<Self, OrderError> {
        if basket.is_empty() {
            return Err(OrderError::EmptyBasket);
        }

        let mut order = Self {
            uuid,
            user: basket.user(),
            basket: basket.uuid(),
            status: OrderStatus::Pending,
            items: Vec::with_capacity(basket.items().len()),
            audit: AuditMetadata::now(),
        };

        for item in basket.items() {
            order.add_item(item.course(), item.price())?;
        }

        Ok(order)
    }

    pub(crate) fn restore(
        uuid: OrderUuid,
        user: UserUuid,
        basket: BasketUuid,
        status: OrderStatus,
        items: Vec<OrderItem>,
        audit: AuditMetadata,
    ) -> Self {
        Self {
            uuid,
            user,
            basket,
            status,
            items,
            audit,
        }
    }

    #[must_use]
    pub const fn uuid(&self) -> OrderUuid {
        self.uuid
    }

    #[must_use]
    pub const fn user(&self) -> UserUuid {
        self.user
    }

    #[must_use]
    pub const fn basket(&self) -> BasketUuid {
        self.basket
    }

    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    #[must_use]
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    #[must_use]
    pub const fn audit(&self) -> &AuditMetadata {
        &self.audit
    }

    #[must_use]
    pub fn contains_course(&self, course: CourseUuid) -> bool {
        self.items.iter().any(|item| item.course == course)
    }

    /// Sum of frozen item prices.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.items
            .iter()
            .fold(0_u64, |total, item| total.saturating_add(item.price))
    }

    /// Append an item while the order is still pending.
    ///
    /// # Errors
    ///
    /// Fails once the order is terminal or when the course is already listed.
    pub fn add_item(&mut self, course: CourseUuid, price: u64) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::Closed(self.status));
        }

        if self.contains_course(course) {
            return Err(OrderError::DuplicateCourse(course));
        }

        self.items.push(OrderItem { course, price });

        Ok(())
    }

    /// Move to `Completed`. Returns `false` if the order was already completed.
    ///
    /// # Errors
    ///
    /// Fails when the order has been canceled.
    pub fn mark_completed(&mut self) -> Result<bool, OrderError> {
        self.transition(OrderStatus::Completed)
    }

    /// Move to `Canceled`. Returns `false` if the order was already canceled.
    ///
    /// # Errors
    ///
    /// Fails when the order has been completed.
    pub fn mark_canceled(&mut self) -> Result<bool, OrderError> {
        self.transition(OrderStatus::Canceled)
    }

    fn transition(&mut self, to: OrderStatus) -> Result<bool, OrderError> {
        match self.status {
            from if from == to => Ok(false),
            OrderStatus::Pending => {
                self.status = to;
                self.audit.touch();

                Ok(true)
            }
            from => Err(OrderError::InvalidTransition { from, to }),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::domain::courses::records::CourseRecord;

    use super::*;

    fn course(price: u64) -> CourseRecord {
        CourseRecord {
            uuid: CourseUuid::new(),
            title: "Course".to_string(),
            price,
            published: true,
            audit: AuditMetadata::now(),
        }
    }

    fn basket_with(prices: &[u64]) -> Result<Basket, OrderError> {
        let mut basket = Basket::new(BasketUuid::new(), UserUuid::new());

        for price in prices {
            basket
                .add_course(&course(*price))
                .map_err(|_| OrderError::EmptyBasket)?;
        }

        Ok(basket)
    }

    fn pending_order() -> Result<Order, OrderError> {
        Order::from_basket(OrderUuid::new(), &basket_with(&[10_00, 15_00])?)
    }

    #[test]
    fn from_basket_copies_items_and_owner() -> TestResult {
        let basket = basket_with(&[10_00, 15_00])?;
        let order = Order::from_basket(OrderUuid::new(), &basket)?;

        assert_eq!(order.user(), basket.user());
        assert_eq!(order.basket(), basket.uuid());
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total(), 25_00);

        let courses: Vec<_> = order.items().iter().map(|item| item.course).collect();
        let expected: Vec<_> = basket.items().iter().map(|item| item.course()).collect();

        assert_eq!(courses, expected);

        Ok(())
    }

    #[test]
    fn from_empty_basket_fails() -> TestResult {
        let basket = basket_with(&[])?;

        assert!(matches!(
            Order::from_basket(OrderUuid::new(), &basket),
            Err(OrderError::EmptyBasket)
        ));

        Ok(())
    }

    #[test]
    fn duplicate_course_is_rejected() -> TestResult {
        let mut order = pending_order()?;
        let existing = order.items()[0].course;

        assert_eq!(
            order.add_item(existing, 1),
            Err(OrderError::DuplicateCourse(existing))
        );
        assert_eq!(order.items().len(), 2);

        Ok(())
    }

    #[test]
    fn mark_completed_is_idempotent() -> TestResult {
        let mut order = pending_order()?;

        assert!(order.mark_completed()?);
        assert!(!order.mark_completed()?);
        assert_eq!(order.status(), OrderStatus::Completed);

        Ok(())
    }

    #[test]
    fn completed_order_cannot_be_canceled() -> TestResult {
        let mut order = pending_order()?;

        order.mark_completed()?;

        assert_eq!(
            order.mark_canceled(),
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Completed,
                to: OrderStatus::Canceled,
            })
        );
        assert_eq!(order.status(), OrderStatus::Completed);

        Ok(())
    }

    #[test]
    fn canceled_order_cannot_be_completed_or_extended() -> TestResult {
        let mut order = pending_order()?;

        assert!(order.mark_canceled()?);
        assert!(!order.mark_canceled()?);

        assert_eq!(
            order.mark_completed(),
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Canceled,
                to: OrderStatus::Completed,
            })
        );
        assert_eq!(
            order.add_item(CourseUuid::new(), 1),
            Err(OrderError::Closed(OrderStatus::Canceled))
        );

        Ok(())
    }

    #[test]
    fn purchaser_display_name_joins_names() {
        let purchaser = Purchaser {
            uuid: UserUuid::new(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        };

        assert_eq!(purchaser.display_name(), "Ada Lovelace");
    }
}
