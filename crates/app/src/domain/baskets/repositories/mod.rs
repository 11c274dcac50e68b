//! Basket Repositories

mod baskets;
mod items;

pub(crate) use baskets::{BasketHeader, PgBasketsRepository};
pub(crate) use items::PgBasketItemsRepository;
