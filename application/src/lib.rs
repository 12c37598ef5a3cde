//! Application provides the HTTP surface of the claims portal over the
//! [`Service`].

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

pub mod access;
pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;
pub mod session;

use axum::{
    middleware,
    routing::{get, post},
    Extension, Router,
};
// Used in binary.
use axum_client_ip as _;
use futures as _;
use refinery as _;
use tokio as _;
use tower_http as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::Context,
    error::{AsError, Error},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service = service::Service<service::infra::Postgres>;

/// Builds the [`Router`] serving the portal.
///
/// Every request, including the ones to unknown paths, passes the
/// [`access::guard()`] before reaching its handler.
pub fn router(service: Service, cookies: session::Cookies) -> Router {
    use api::{auth, page};

    Router::new()
        .route("/", get(page::landing))
        .route("/login", get(page::login).post(auth::login))
        .route("/signup", get(page::signup).post(auth::signup))
        .route("/logout", post(auth::logout))
        .route("/registry", get(page::dashboard))
        .route("/registry/*rest", get(page::dashboard))
        .route("/coordinator", get(page::dashboard))
        .route("/coordinator/*rest", get(page::dashboard))
        .route("/lecturer", get(page::dashboard))
        .route("/lecturer/*rest", get(page::dashboard))
        .route("/profile", get(page::profile))
        .route("/settings", get(page::settings))
        .route("/unauthorized", get(page::unauthorized))
        .fallback(page::not_found)
        .layer(middleware::from_fn(access::guard))
        .layer(Extension(cookies))
        .layer(Extension(service))
}
