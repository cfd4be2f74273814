//! Shared helpers for unit tests.

pub(crate) mod scripted;
pub(crate) mod socket_guard;
