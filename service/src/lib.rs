//! Service contains the business logic of the claims portal: users, their
//! sessions and access control over portal paths.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;

// Used by `common::define_kind!` expansions.
use strum as _;

#[cfg(doc)]
use infra::Database;

use crate::domain::{user::session, Policy};

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [`session::Codec`] issuing and reading session cookies.
    pub session_codec: session::Codec,

    /// [`Policy`] guarding portal paths.
    pub access_policy: Policy,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] over the provided `database` handle.
    #[must_use]
    pub fn new(config: Config, database: Db) -> Self {
        Self { config, database }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the [`session::Codec`] of this [`Service`].
    #[must_use]
    pub fn session_codec(&self) -> &session::Codec {
        &self.config.session_codec
    }

    /// Returns the access [`Policy`] of this [`Service`].
    #[must_use]
    pub fn access_policy(&self) -> &Policy {
        &self.config.access_policy
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }
}
