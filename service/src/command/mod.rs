//! [`Command`] definition.

pub mod create_user;
pub mod create_user_session;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_user::CreateUser, create_user_session::CreateUserSession,
};
