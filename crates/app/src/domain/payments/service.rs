//! Payments service.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        orders::{
            PgOrdersRepository,
            models::{OrderUuid, Purchaser},
        },
        payments::{
            data::NewPayment,
            errors::{PaymentError, PaymentsServiceError},
            gateway::{CardDetails, Charge, ChargeRequest, GatewayError, NewCustomer, PaymentGateway},
            models::{Payment, PaymentStatus, PaymentUuid},
            repository::PgPaymentsRepository,
        },
        users::records::UserUuid,
    },
};

/// Default ISO currency code for charges.
pub const DEFAULT_CURRENCY: &str = "usd";

/// Default upper bound on a single gateway round trip.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub currency: String,
    pub gateway_timeout: Duration,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }
}

#[derive(Clone)]
pub struct PgPaymentsService {
    db: Db,
    repository: PgPaymentsRepository,
    orders_repository: PgOrdersRepository,
    gateway: Arc<dyn PaymentGateway>,
    settings: PaymentSettings,
}

impl fmt::Debug for PgPaymentsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgPaymentsService")
            .field("provider", &self.gateway.provider())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db, gateway: Arc<dyn PaymentGateway>, settings: PaymentSettings) -> Self {
        Self {
            db,
            repository: PgPaymentsRepository::new(),
            orders_repository: PgOrdersRepository::new(),
            gateway,
            settings,
        }
    }

    fn settlement(&self) -> Settlement {
        Settlement {
            db: self.db.clone(),
            repository: self.repository.clone(),
            orders_repository: self.orders_repository.clone(),
            gateway: Arc::clone(&self.gateway),
            timeout: self.settings.gateway_timeout,
        }
    }
}

/// Settlement writes attempted before giving up on a storage error.
const SETTLE_ATTEMPTS: u32 = 3;

const SETTLE_RETRY_DELAY: Duration = Duration::from_millis(200);

const DUPLICATE_TRANSACTION_REASON: &str =
    "gateway transaction id is already recorded against another payment";

/// Everything needed to finish a payment once the caller has gone away.
struct Settlement {
    db: Db,
    repository: PgPaymentsRepository,
    orders_repository: PgOrdersRepository,
    gateway: Arc<dyn PaymentGateway>,
    timeout: Duration,
}

impl Settlement {
    /// Charge the card and record the outcome. Every gateway result ends as
    /// Success or Failed; only a persistent storage failure leaves the
    /// payment pending, and that is logged with the payment uuid.
    async fn run(
        self,
        pending: Payment,
        purchaser: Purchaser,
        card: CardDetails,
    ) -> Result<Payment, PaymentsServiceError> {
        let outcome =
            tokio::time::timeout(self.timeout, self.charge(&pending, purchaser, card)).await;

        let mut payment = pending.clone();

        self.apply_outcome(&mut payment, outcome)?;

        let payment = match self.persist(&payment).await {
            Ok(()) => payment,
            Err(PaymentsServiceError::PaymentExists) if payment.is_successful() => {
                tracing::error!(
                    payment_uuid = %payment.uuid(),
                    transaction_id = payment.transaction_id().unwrap_or_default(),
                    "gateway returned a transaction id that is already recorded"
                );

                let mut failed = pending;

                failed.mark_failed(DUPLICATE_TRANSACTION_REASON)?;

                self.persist(&failed).await?;

                failed
            }
            Err(error) => return Err(error),
        };

        tracing::info!(
            payment_uuid = %payment.uuid(),
            order_uuid = %payment.order(),
            status = %payment.status(),
            amount = payment.amount(),
            "settled payment"
        );

        Ok(payment)
    }

    fn apply_outcome(
        &self,
        payment: &mut Payment,
        outcome: Result<Result<Charge, GatewayError>, tokio::time::error::Elapsed>,
    ) -> Result<(), PaymentError> {
        match outcome {
            Ok(Ok(charge)) if charge.succeeded => {
                if let Err(error) = payment.mark_successful(charge.id) {
                    tracing::warn!(
                        payment_uuid = %payment.uuid(),
                        error = %error,
                        "gateway reported success without a usable charge"
                    );

                    payment.mark_failed(format!("unusable charge from gateway: {error}"))?;
                }
            }
            Ok(Ok(charge)) => payment.mark_failed(
                charge
                    .failure_message
                    .unwrap_or_else(|| "charge was not successful".to_string()),
            )?,
            Ok(Err(error)) => {
                tracing::warn!(
                    payment_uuid = %payment.uuid(),
                    error = %error,
                    "payment gateway refused charge"
                );

                payment.mark_failed(error.to_string())?;
            }
            Err(_elapsed) => {
                tracing::warn!(
                    payment_uuid = %payment.uuid(),
                    timeout_ms = self.timeout.as_millis(),
                    "payment gateway timed out"
                );

                payment.mark_failed("payment gateway timed out")?;
            }
        }

        Ok(())
    }

    /// Write the settlement, retrying storage errors with a growing delay.
    async fn persist(&self, payment: &Payment) -> Result<(), PaymentsServiceError> {
        let mut attempt = 1;

        loop {
            match self.write_settlement(payment).await {
                Ok(()) => return Ok(()),
                Err(PaymentsServiceError::Sql(error)) if attempt < SETTLE_ATTEMPTS => {
                    tracing::warn!(
                        payment_uuid = %payment.uuid(),
                        attempt,
                        error = %error,
                        "retrying payment settlement"
                    );

                    tokio::time::sleep(SETTLE_RETRY_DELAY * attempt).await;

                    attempt += 1;
                }
                Err(PaymentsServiceError::Sql(error)) => {
                    tracing::error!(
                        payment_uuid = %payment.uuid(),
                        order_uuid = %payment.order(),
                        status = %payment.status(),
                        transaction_id = payment.transaction_id().unwrap_or_default(),
                        error = %error,
                        "could not record payment settlement, payment is still pending"
                    );

                    return Err(PaymentsServiceError::Sql(error));
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn write_settlement(&self, payment: &Payment) -> Result<(), PaymentsServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        if self.repository.settle_payment(&mut tx, payment).await? == 0 {
            return Err(PaymentsServiceError::NotFound);
        }

        if payment.is_successful() {
            let mut order = self
                .orders_repository
                .lock_order(&mut tx, payment.order())
                .await?;

            if order.mark_completed()? {
                self.orders_repository
                    .update_order_status(&mut tx, order.uuid(), order.status())
                    .await?;
            }
        }

        tx.commit().await?;

        Ok(())
    }

    async fn charge(
        &self,
        payment: &Payment,
        purchaser: Purchaser,
        card: CardDetails,
    ) -> Result<Charge, GatewayError> {
        let customer = self
            .gateway
            .create_customer(NewCustomer {
                name: purchaser.display_name(),
                email: purchaser.email,
                card,
            })
            .await?;

        self.gateway
            .create_charge(ChargeRequest {
                idempotency_key: payment.uuid().to_string(),
                customer,
                amount: payment.amount(),
                currency: payment.currency().to_string(),
                description: format!("Order {}", payment.order()),
            })
            .await
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    async fn process_payment(
        &self,
        user: UserUuid,
        payment: NewPayment,
    ) -> Result<Payment, PaymentsServiceError> {
        let NewPayment { order, card } = payment;

        let mut tx = self.db.begin_unit_of_work().await?;

        let order = self
            .orders_repository
            .lock_order(&mut tx, order)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => PaymentsServiceError::OrderNotFound,
                other => other.into(),
            })?;

        if order.user() != user {
            return Err(PaymentsServiceError::OrderNotFound);
        }

        let pending = Payment::new(
            PaymentUuid::new(),
            &order,
            self.gateway.provider(),
            self.settings.currency.as_str(),
        )?;

        self.repository.create_payment(&mut tx, &pending).await?;

        let purchaser = self.orders_repository.get_purchaser(&mut tx, user).await?;

        tx.commit().await?;

        tracing::info!(
            payment_uuid = %pending.uuid(),
            order_uuid = %pending.order(),
            amount = pending.amount(),
            "created pending payment"
        );

        // Settle on a detached task so that a dropped request cannot strand
        // the payment between the gateway call and the database write.
        let settlement = self.settlement();
        let payment = tokio::spawn(settlement.run(pending, purchaser, card))
            .await
            .map_err(PaymentsServiceError::Settlement)??;

        match payment.status() {
            PaymentStatus::Failed => Err(PaymentsServiceError::Declined {
                payment: Box::new(payment),
            }),
            PaymentStatus::Success | PaymentStatus::Pending => Ok(payment),
        }
    }

    async fn get_payment(
        &self,
        user: UserUuid,
        payment: PaymentUuid,
    ) -> Result<Payment, PaymentsServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let payment = self.repository.get_payment(&mut tx, payment).await?;

        tx.commit().await?;

        if payment.user() != user {
            return Err(PaymentsServiceError::NotFound);
        }

        Ok(payment)
    }

    async fn get_payment_for_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Payment, PaymentsServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let payment = self
            .repository
            .find_payment_by_order(&mut tx, order)
            .await?
            .filter(|payment| payment.user() == user)
            .ok_or(PaymentsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(payment)
    }

    async fn list_payments(&self, user: UserUuid) -> Result<Vec<Payment>, PaymentsServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let payments = self.repository.list_payments(&mut tx, user).await?;

        tx.commit().await?;

        Ok(payments)
    }

    async fn find_by_transaction_id(
        &self,
        user: UserUuid,
        transaction_id: &str,
    ) -> Result<Payment, PaymentsServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let payment = self
            .repository
            .find_payment_by_transaction_id(&mut tx, transaction_id)
            .await?
            .filter(|payment| payment.user() == user)
            .ok_or(PaymentsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(payment)
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Charge the card for the order total.
    ///
    /// A pending payment is committed first, then the gateway is called with a
    /// bounded timeout. A successful charge completes the order in the same
    /// transaction that settles the payment. Declines, timeouts, a success
    /// without a transaction id and a transaction id already recorded against
    /// another payment are all recorded as failed payments and reported as
    /// [`PaymentsServiceError::Declined`]. Storage errors while settling are
    /// retried before the payment is left pending.
    async fn process_payment(
        &self,
        user: UserUuid,
        payment: NewPayment,
    ) -> Result<Payment, PaymentsServiceError>;

    async fn get_payment(
        &self,
        user: UserUuid,
        payment: PaymentUuid,
    ) -> Result<Payment, PaymentsServiceError>;

    async fn get_payment_for_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Payment, PaymentsServiceError>;

    /// The user's payments, newest first.
    async fn list_payments(&self, user: UserUuid) -> Result<Vec<Payment>, PaymentsServiceError>;

    /// Look a payment up by the gateway's transaction id.
    async fn find_by_transaction_id(
        &self,
        user: UserUuid,
        transaction_id: &str,
    ) -> Result<Payment, PaymentsServiceError>;
}
