//! Payments Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    audit::AuditMetadata,
    database::{amount_to_i64, try_get_amount},
    domain::{
        orders::models::OrderUuid,
        payments::models::{Payment, PaymentParts, PaymentUuid},
        users::records::UserUuid,
    },
};

const CREATE_PAYMENT_SQL: &str = include_str!("sql/create_payment.sql");
const SETTLE_PAYMENT_SQL: &str = include_str!("sql/settle_payment.sql");
const GET_PAYMENT_SQL: &str = include_str!("sql/get_payment.sql");
const FIND_PAYMENT_BY_ORDER_SQL: &str = include_str!("sql/find_payment_by_order.sql");
const FIND_PAYMENT_BY_TRANSACTION_ID_SQL: &str =
    include_str!("sql/find_payment_by_transaction_id.sql");
const LIST_PAYMENTS_SQL: &str = include_str!("sql/list_payments.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: &Payment,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_PAYMENT_SQL)
            .bind(payment.uuid().into_uuid())
            .bind(payment.order().into_uuid())
            .bind(payment.user().into_uuid())
            .bind(payment.status().as_str())
            .bind(amount_to_i64(payment.amount(), "amount")?)
            .bind(payment.currency())
            .bind(payment.provider())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Persist the outcome of a pending payment. Returns 0 when the payment
    /// was already settled.
    pub(crate) async fn settle_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: &Payment,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SETTLE_PAYMENT_SQL)
            .bind(payment.uuid().into_uuid())
            .bind(payment.status().as_str())
            .bind(payment.transaction_id())
            .bind(payment.is_successful())
            .bind(payment.failure_reason())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn get_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<Payment, sqlx::Error> {
        query_as::<Postgres, Payment>(GET_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_payment_by_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Option<Payment>, sqlx::Error> {
        query_as::<Postgres, Payment>(FIND_PAYMENT_BY_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_payment_by_transaction_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        transaction_id: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        query_as::<Postgres, Payment>(FIND_PAYMENT_BY_TRANSACTION_ID_SQL)
            .bind(transaction_id)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        query_as::<Postgres, Payment>(LIST_PAYMENTS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Payment {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self::restore(PaymentParts {
            uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
            order: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            status: status.parse().map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?,
            transaction_id: row.try_get("transaction_id")?,
            amount: try_get_amount(row, "amount")?,
            currency: row.try_get("currency")?,
            provider: row.try_get("provider")?,
            failure_reason: row.try_get("failure_reason")?,
            audit: AuditMetadata::from_row(row)?,
        }))
    }
}
