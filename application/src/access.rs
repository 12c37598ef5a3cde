//! Access control middleware.

use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::{IntoResponse as _, Redirect, Response},
    Extension,
};
use service::domain::access::Decision;
use tracing as log;

use crate::{context::ResolvedSession, session, Service};

/// Resolves the [`Session`] of every request and lets it through only if the
/// access [`Policy`] allows it, redirecting it otherwise.
///
/// Safe requests are redirected with `307 Temporary Redirect`, while any other
/// ones get `303 See Other`, so the browser follows up with a `GET` instead of
/// re-sending the submitted body.
///
/// [`Policy`]: service::domain::Policy
/// [`Session`]: service::domain::user::Session
pub async fn guard(
    Extension(service): Extension<Service>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = session::resolve(req.headers(), service.session_codec());

    match service
        .access_policy()
        .evaluate(session.as_ref(), req.uri().path())
    {
        Decision::Allow => {
            drop(req.extensions_mut().insert(ResolvedSession(session)));
            next.run(req).await
        }
        Decision::RedirectTo(to) => {
            log::debug!(
                user_id = ?session.as_ref().map(|s| s.user_id),
                "redirecting `{}` to `{to}`",
                req.uri().path(),
            );
            if matches!(*req.method(), Method::GET | Method::HEAD) {
                Redirect::temporary(to).into_response()
            } else {
                Redirect::to(to).into_response()
            }
        }
    }
}
