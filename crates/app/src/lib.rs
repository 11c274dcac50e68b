//! Commerce core for the course marketplace: baskets, orders, payments,
//! enrollments and refresh-token sessions on top of `PostgreSQL`.

pub mod audit;
pub mod auth;
pub mod context;
pub mod database;
pub mod domain;
pub mod uuids;

#[cfg(test)]
mod test;
