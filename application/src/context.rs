//! [`Context`]-related definitions.

use axum::{async_trait, extract::FromRequestParts};
use service::domain::user::Session;

use crate::{define_error, session, Error, Service};

/// Application context of a single HTTP request.
#[derive(Clone, Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// [`Session`] of the visitor, if signed in.
    session: Option<Session>,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the [`Session`] of the visitor, if signed in.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Returns the [`Session`] of the signed-in visitor.
    ///
    /// # Errors
    ///
    /// Errors if the visitor is not signed in.
    pub fn current_session(&self) -> Result<&Session, Error> {
        self.session()
            .ok_or_else(|| AuthError::AuthorizationRequired.into())
    }
}

/// [`Session`] already resolved for the current request.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedSession(pub(crate) Option<Session>);

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;

        let session = match parts.extensions.get::<ResolvedSession>() {
            Some(ResolvedSession(s)) => s.clone(),
            None => session::resolve(&parts.headers, service.session_codec()),
        };

        Ok(Self { service, session })
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "MISSING_CREDENTIALS"]
        #[status = BAD_REQUEST]
        #[message = "Email and password are required"]
        MissingCredentials,

        #[code = "INVALID_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid email or password"]
        InvalidCredentials,
    }
}
