//! Order Models

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coursemart_app::domain::orders::models::{Order, OrderDetails, OrderItem, Purchaser};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemResponse {
    pub course_id: Uuid,

    /// Price in minor units, frozen when the order was placed
    pub price: u64,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        OrderItemResponse {
            course_id: item.course.into(),
            price: item.price,
        }
    }
}

/// Order response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub basket_id: Uuid,

    /// `pending`, `completed` or `canceled`
    pub status: String,

    pub items: Vec<OrderItemResponse>,
    pub total: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        OrderResponse {
            id: order.uuid().into(),
            user_id: order.user().into(),
            basket_id: order.basket().into(),
            status: order.status().as_str().to_string(),
            items: order.items().iter().map(OrderItemResponse::from).collect(),
            total: order.total(),
            created_at: order.audit().created_at().to_string(),
            updated_at: order.audit().updated_at().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PurchaserResponse {
    pub id: Uuid,
    pub email: String,

    /// First and last name
    pub display_name: String,
}

impl From<Purchaser> for PurchaserResponse {
    fn from(purchaser: Purchaser) -> Self {
        let display_name = purchaser.display_name();

        PurchaserResponse {
            id: purchaser.uuid.into(),
            email: purchaser.email,
            display_name,
        }
    }
}

/// Order with purchaser
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderDetailsResponse {
    pub order: OrderResponse,
    pub purchaser: PurchaserResponse,
}

impl From<OrderDetails> for OrderDetailsResponse {
    fn from(details: OrderDetails) -> Self {
        OrderDetailsResponse {
            order: OrderResponse::from(&details.order),
            purchaser: details.purchaser.into(),
        }
    }
}
