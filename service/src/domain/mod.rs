//! Domain definitions.

pub mod access;
pub mod user;

pub use self::{access::Policy, user::User};
