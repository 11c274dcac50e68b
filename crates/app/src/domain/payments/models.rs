//! Payment aggregate.

use std::{fmt, str::FromStr};

use crate::{
    audit::AuditMetadata,
    domain::{
        orders::models::{Order, OrderStatus, OrderUuid},
        payments::errors::PaymentError,
        users::records::UserUuid,
    },
    uuids::TypedUuid,
};

/// Payment UUID
pub type PaymentUuid = TypedUuid<Payment>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = PaymentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            other => Err(PaymentError::UnknownStatus(other.to_string())),
        }
    }
}

/// A single charge attempt against an order.
#[derive(Debug, Clone)]
pub struct Payment {
    uuid: PaymentUuid,
    order: OrderUuid,
    user: UserUuid,
    status: PaymentStatus,
    transaction_id: Option<String>,
    amount: u64,
    currency: String,
    provider: String,
    failure_reason: Option<String>,
    audit: AuditMetadata,
}

/// Stored payment fields, used when loading a payment back.
#[derive(Debug, Clone)]
pub(crate) struct PaymentParts {
    pub uuid: PaymentUuid,
    pub order: OrderUuid,
    pub user: UserUuid,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub amount: u64,
    pub currency: String,
    pub provider: String,
    pub failure_reason: Option<String>,
    pub audit: AuditMetadata,
}

impl Payment {
    /// A pending payment for the full order total.
    ///
    /// # Errors
    ///
    /// Fails when the order is no longer pending.
    pub fn new(
        uuid: PaymentUuid,
        order: &Order,
        provider: impl Into<String>,
        currency: impl Into<String>,
    ) -> Result<Self, PaymentError> {
        if order.status() != OrderStatus::Pending {
            return Err(PaymentError::OrderNotPayable(order.status()));
        }

        Ok(Self {
            uuid,
            order: order.uuid(),
            user: order.user(),
            status: PaymentStatus::Pending,
            transaction_id: None,
            amount: order.total(),
            currency: currency.into(),
            provider: provider.into(),
            failure_reason: None,
            audit: AuditMetadata::now(),
        })
    }

    pub(crate) fn restore(parts: PaymentParts) -> Self {
        Self {
            uuid: parts.uuid,
            order: parts.order,
            user: parts.user,
            status: parts.status,
            transaction_id: parts.transaction_id,
            amount: parts.amount,
            currency: parts.currency,
            provider: parts.provider,
            failure_reason: parts.failure_reason,
            audit: parts.audit,
        }
    }

    #[must_use]
    pub const fn uuid(&self) -> PaymentUuid {
        self.uuid
    }

    #[must_use]
    pub const fn order(&self) -> OrderUuid {
        self.order
    }

    #[must_use]
    pub const fn user(&self) -> UserUuid {
        self.user
    }

    #[must_use]
    pub const fn status(&self) -> PaymentStatus {
        self.status
    }

    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.amount
    }

    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    #[must_use]
    pub const fn is_successful(&self) -> bool {
        matches!(self.status, PaymentStatus::Success)
    }

    #[must_use]
    pub const fn audit(&self) -> &AuditMetadata {
        &self.audit
    }

    /// Record a successful charge.
    ///
    /// # Errors
    ///
    /// Fails when the transaction id is blank or the payment is already settled.
    pub fn mark_successful(&mut self, transaction_id: impl Into<String>) -> Result<(), PaymentError> {
        self.ensure_pending()?;

        let transaction_id = transaction_id.into();

        if transaction_id.trim().is_empty() {
            return Err(PaymentError::MissingTransactionId);
        }

        self.status = PaymentStatus::Success;
        self.transaction_id = Some(transaction_id);
        self.audit.touch();

        Ok(())
    }

    /// Record a declined or abandoned charge.
    ///
    /// # Errors
    ///
    /// Fails when the payment is already settled.
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<(), PaymentError> {
        self.ensure_pending()?;

        self.status = PaymentStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.audit.touch();

        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), PaymentError> {
        match self.status {
            PaymentStatus::Pending => Ok(()),
            settled => Err(PaymentError::AlreadySettled(settled)),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::domain::{
        baskets::models::{Basket, BasketUuid},
        courses::records::{CourseRecord, CourseUuid},
        orders::models::OrderUuid,
    };

    use super::*;

    fn pending_order(price: u64) -> TestResult<Order> {
        let mut basket = Basket::new(BasketUuid::new(), UserUuid::new());

        basket.add_course(&CourseRecord {
            uuid: CourseUuid::new(),
            title: "Course".to_string(),
            price,
            published: true,
            audit: AuditMetadata::now(),
        })?;

        Ok(Order::from_basket(OrderUuid::new(), &basket)?)
    }

    fn payment(price: u64) -> TestResult<Payment> {
        Ok(Payment::new(
            PaymentUuid::new(),
            &pending_order(price)?,
            "stripe",
            "usd",
        )?)
    }

    #[test]
    fn new_payment_is_pending_for_order_total() -> TestResult {
        let order = pending_order(42_00)?;
        let payment = Payment::new(PaymentUuid::new(), &order, "stripe", "usd")?;

        assert_eq!(payment.status(), PaymentStatus::Pending);
        assert_eq!(payment.amount(), 42_00);
        assert_eq!(payment.order(), order.uuid());
        assert_eq!(payment.user(), order.user());
        assert!(payment.transaction_id().is_none());
        assert!(!payment.is_successful());

        Ok(())
    }

    #[test]
    fn completed_order_cannot_be_paid() -> TestResult {
        let mut order = pending_order(10_00)?;
        order.mark_completed()?;

        let result = Payment::new(PaymentUuid::new(), &order, "stripe", "usd");

        assert!(
            matches!(
                result,
                Err(PaymentError::OrderNotPayable(OrderStatus::Completed))
            ),
            "expected OrderNotPayable, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn mark_successful_requires_transaction_id() -> TestResult {
        let mut payment = payment(10_00)?;

        assert_eq!(
            payment.mark_successful(" "),
            Err(PaymentError::MissingTransactionId)
        );
        assert_eq!(payment.status(), PaymentStatus::Pending);

        payment.mark_successful("ch_123")?;

        assert!(payment.is_successful());
        assert_eq!(payment.transaction_id(), Some("ch_123"));

        Ok(())
    }

    #[test]
    fn settled_payment_cannot_change_again() -> TestResult {
        let mut payment = payment(10_00)?;

        payment.mark_failed("card declined")?;

        assert_eq!(
            payment.mark_successful("ch_123"),
            Err(PaymentError::AlreadySettled(PaymentStatus::Failed))
        );
        assert_eq!(
            payment.mark_failed("again"),
            Err(PaymentError::AlreadySettled(PaymentStatus::Failed))
        );
        assert_eq!(payment.failure_reason(), Some("card declined"));

        Ok(())
    }
}
