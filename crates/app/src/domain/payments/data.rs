//! Payment Data

use crate::domain::{orders::models::OrderUuid, payments::gateway::CardDetails};

/// A request to pay for an order with a card.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order: OrderUuid,
    pub card: CardDetails,
}
