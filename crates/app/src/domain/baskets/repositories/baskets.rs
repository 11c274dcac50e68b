//! Baskets Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    audit::AuditMetadata,
    domain::{
        baskets::models::{Basket, BasketItem, BasketStatus, BasketUuid},
        users::records::UserUuid,
    },
};

const FIND_CURRENT_BASKET_SQL: &str = include_str!("../sql/find_current_basket.sql");
const GET_BASKET_SQL: &str = include_str!("../sql/get_basket.sql");
const CREATE_BASKET_IF_ABSENT_SQL: &str = include_str!("../sql/create_basket_if_absent.sql");
const UPDATE_BASKET_STATUS_SQL: &str = include_str!("../sql/update_basket_status.sql");
const TOUCH_BASKET_SQL: &str = include_str!("../sql/touch_basket.sql");
const RETIRE_BASKET_SQL: &str = include_str!("../sql/retire_basket.sql");

/// A basket row without its items.
#[derive(Debug, Clone)]
pub(crate) struct BasketHeader {
    pub uuid: BasketUuid,
    pub user: UserUuid,
    pub status: BasketStatus,
    pub audit: AuditMetadata,
}

impl BasketHeader {
    pub(crate) fn with_items(self, items: Vec<BasketItem>) -> Basket {
        Basket::restore(self.uuid, self.user, self.status, items, self.audit)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBasketsRepository;

impl PgBasketsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// The user's non-retired basket, locked for the rest of the transaction.
    pub(crate) async fn find_current_basket(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<BasketHeader>, sqlx::Error> {
        query_as::<Postgres, BasketHeader>(FIND_CURRENT_BASKET_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_basket(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
    ) -> Result<BasketHeader, sqlx::Error> {
        query_as::<Postgres, BasketHeader>(GET_BASKET_SQL)
            .bind(basket.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Insert an active basket unless the user already has a current one.
    pub(crate) async fn create_basket_if_absent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CREATE_BASKET_IF_ABSENT_SQL)
            .bind(basket.into_uuid())
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn update_basket_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
        status: BasketStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_BASKET_STATUS_SQL)
            .bind(basket.into_uuid())
            .bind(status.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn touch_basket(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(TOUCH_BASKET_SQL)
            .bind(basket.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn retire_basket(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(RETIRE_BASKET_SQL)
            .bind(basket.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for BasketHeader {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: BasketUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            status: status.parse().map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?,
            audit: AuditMetadata::from_row(row)?,
        })
    }
}
