//! Session Handlers

pub(crate) mod login;
pub(crate) mod refresh;
pub(crate) mod revoke;
