//! Basket Items Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::{amount_to_i64, try_get_amount},
    domain::{
        baskets::models::{BasketItem, BasketUuid},
        courses::records::CourseUuid,
    },
};

const GET_BASKET_ITEMS_SQL: &str = include_str!("../sql/get_basket_items.sql");
const CREATE_BASKET_ITEM_SQL: &str = include_str!("../sql/create_basket_item.sql");
const DELETE_BASKET_ITEM_SQL: &str = include_str!("../sql/delete_basket_item.sql");
const DELETE_BASKET_ITEMS_SQL: &str = include_str!("../sql/delete_basket_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBasketItemsRepository;

impl PgBasketItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Items in insertion order.
    pub(crate) async fn get_basket_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
    ) -> Result<Vec<BasketItem>, sqlx::Error> {
        query_as::<Postgres, BasketItem>(GET_BASKET_ITEMS_SQL)
            .bind(basket.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_basket_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
        item: &BasketItem,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_BASKET_ITEM_SQL)
            .bind(basket.into_uuid())
            .bind(item.course().into_uuid())
            .bind(amount_to_i64(item.price(), "price")?)
            .bind(SqlxTimestamp::from(item.added_at()))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn delete_basket_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
        course: CourseUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_BASKET_ITEM_SQL)
            .bind(basket.into_uuid())
            .bind(course.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_basket_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_BASKET_ITEMS_SQL)
            .bind(basket.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for BasketItem {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self::restore(
            CourseUuid::from_uuid(row.try_get("course_uuid")?),
            try_get_amount(row, "price")?,
            row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        ))
    }
}
