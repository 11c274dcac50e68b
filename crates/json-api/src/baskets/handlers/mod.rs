//! Basket Handlers

pub(crate) mod add_course;
pub(crate) mod clear;
pub(crate) mod complete;
pub(crate) mod get;
pub(crate) mod remove_course;
