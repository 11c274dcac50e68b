//! Orders Repository

use std::collections::HashMap;

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    audit::AuditMetadata,
    database::{amount_to_i64, try_get_amount},
    domain::{
        baskets::models::BasketUuid,
        courses::records::CourseUuid,
        orders::models::{Order, OrderItem, OrderStatus, OrderUuid, Purchaser},
        users::records::UserUuid,
    },
};

const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LOCK_ORDER_SQL: &str = include_str!("sql/lock_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const GET_PURCHASER_SQL: &str = include_str!("sql/get_purchaser.sql");

struct OrderHeader {
    uuid: OrderUuid,
    user: UserUuid,
    basket: BasketUuid,
    status: OrderStatus,
    audit: AuditMetadata,
}

impl OrderHeader {
    fn with_items(self, items: Vec<OrderItem>) -> Order {
        Order::restore(
            self.uuid,
            self.user,
            self.basket,
            self.status,
            items,
            self.audit,
        )
    }
}

struct OrderItemRow {
    order: Uuid,
    item: OrderItem,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Order, sqlx::Error> {
        let header = query_as::<Postgres, OrderHeader>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        self.attach_items(tx, vec![header])
            .await?
            .pop()
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Like [`Self::get_order`], holding a row lock until the transaction ends.
    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Order, sqlx::Error> {
        let header = query_as::<Postgres, OrderHeader>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        self.attach_items(tx, vec![header])
            .await?
            .pop()
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// A user's orders, newest first, optionally filtered by status.
    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let headers = query_as::<Postgres, OrderHeader>(LIST_ORDERS_SQL)
            .bind(user.into_uuid())
            .bind(status.map(OrderStatus::as_str))
            .fetch_all(&mut **tx)
            .await?;

        self.attach_items(tx, headers).await
    }

    /// Insert the order row and its items in position order.
    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_ORDER_SQL)
            .bind(order.uuid().into_uuid())
            .bind(order.user().into_uuid())
            .bind(order.basket().into_uuid())
            .bind(order.status().as_str())
            .execute(&mut **tx)
            .await?;

        for (position, item) in order.items().iter().enumerate() {
            let position = i32::try_from(position).map_err(|e| sqlx::Error::ColumnDecode {
                index: "position".to_string(),
                source: Box::new(e),
            })?;

            query(CREATE_ORDER_ITEM_SQL)
                .bind(order.uuid().into_uuid())
                .bind(item.course.into_uuid())
                .bind(amount_to_i64(item.price, "price")?)
                .bind(position)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    pub(crate) async fn update_order_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn get_purchaser(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Purchaser, sqlx::Error> {
        query_as::<Postgres, Purchaser>(GET_PURCHASER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    async fn attach_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        headers: Vec<OrderHeader>,
    ) -> Result<Vec<Order>, sqlx::Error> {
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let uuids: Vec<Uuid> = headers.iter().map(|h| h.uuid.into_uuid()).collect();

        let rows = query_as::<Postgres, OrderItemRow>(GET_ORDER_ITEMS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut items: HashMap<Uuid, Vec<OrderItem>> = HashMap::with_capacity(headers.len());

        for row in rows {
            items.entry(row.order).or_default().push(row.item);
        }

        Ok(headers
            .into_iter()
            .map(|header| {
                let order_items = items.remove(&header.uuid.into_uuid()).unwrap_or_default();

                header.with_items(order_items)
            })
            .collect())
    }
}

impl<'r> FromRow<'r, PgRow> for OrderHeader {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            basket: BasketUuid::from_uuid(row.try_get("basket_uuid")?),
            status: status.parse().map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?,
            audit: AuditMetadata::from_row(row)?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order: row.try_get("order_uuid")?,
            item: OrderItem {
                course: CourseUuid::from_uuid(row.try_get("course_uuid")?),
                price: try_get_amount(row, "price")?,
            },
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Purchaser {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
        })
    }
}
