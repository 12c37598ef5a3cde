//! HTTP API of the portal.

pub mod auth;
pub mod page;
