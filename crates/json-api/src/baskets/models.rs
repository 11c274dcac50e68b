//! Basket Models

use salvo::oapi::{ToParameters, ToSchema};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coursemart_app::domain::baskets::models::{Basket, BasketItem};

/// `?userId=` query
#[derive(Debug, Deserialize, ToParameters)]
#[salvo(parameters(default_parameter_in = Query, rename_all = "camelCase"))]
#[serde(rename_all = "camelCase")]
pub(crate) struct BasketUserQuery {
    /// Basket owner
    pub user_id: Uuid,
}

/// `?userId=&courseId=` query
#[derive(Debug, Deserialize, ToParameters)]
#[salvo(parameters(default_parameter_in = Query, rename_all = "camelCase"))]
#[serde(rename_all = "camelCase")]
pub(crate) struct BasketCourseQuery {
    /// Basket owner
    pub user_id: Uuid,

    /// Course to add or remove
    pub course_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BasketItemResponse {
    pub course_id: Uuid,

    /// Price in minor units when the course was added
    pub price: u64,

    pub added_at: String,
}

impl From<&BasketItem> for BasketItemResponse {
    fn from(item: &BasketItem) -> Self {
        BasketItemResponse {
            course_id: item.course().into(),
            price: item.price(),
            added_at: item.added_at().to_string(),
        }
    }
}

/// Basket response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BasketResponse {
    pub id: Uuid,
    pub user_id: Uuid,

    /// `active` or `completed`
    pub status: String,

    pub items: Vec<BasketItemResponse>,

    /// Sum of item prices in minor units
    pub total: u64,

    pub created_at: String,
    pub updated_at: String,
}

impl From<Basket> for BasketResponse {
    fn from(basket: Basket) -> Self {
        BasketResponse {
            id: basket.uuid().into(),
            user_id: basket.user().into(),
            status: basket.status().as_str().to_string(),
            items: basket.items().iter().map(BasketItemResponse::from).collect(),
            total: basket.total(),
            created_at: basket.audit().created_at().to_string(),
            updated_at: basket.audit().updated_at().to_string(),
        }
    }
}
