//! Sign-in, sign-up and sign-out endpoints.

use axum::{response::Redirect, Extension, Form};
use axum_extra::extract::CookieJar;
use secrecy::{ExposeSecret as _, SecretBox, SecretString};
use serde::Deserialize;
use service::{
    command::{self, Command as _},
    domain::{
        access::LOGIN_PATH,
        user::{self, Role},
    },
};
use tracing as log;

use crate::{
    context::AuthError, define_error, session::Cookies, AsError, Context,
    Error,
};

/// Form submitted to sign in.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Email of the [`User`].
    ///
    /// [`User`]: service::domain::User
    pub email: Option<String>,

    /// Password of the [`User`].
    ///
    /// [`User`]: service::domain::User
    pub password: Option<SecretString>,
}

/// Form submitted to sign up.
#[derive(Debug, Deserialize)]
pub struct SignUp {
    /// Optional display name.
    pub name: Option<String>,

    /// Email to sign in with.
    pub email: Option<String>,

    /// Password to sign in with.
    pub password: Option<SecretString>,
}

/// Signs the visitor in by the provided [`Credentials`], storing the new
/// session in a cookie and redirecting to the home of the visitor's [`Role`].
///
/// # Errors
///
/// Errors if the [`Credentials`] are missing or do not match any user.
pub async fn login(
    ctx: Context,
    Extension(cookies): Extension<Cookies>,
    jar: CookieJar,
    Form(form): Form<Credentials>,
) -> Result<(CookieJar, Redirect), Error> {
    let (email, password) = required(form.email, form.password)?;

    // A malformed address cannot belong to anybody, so it is reported just
    // like any other mismatch.
    let (Some(email), Some(password)) = (
        user::Email::new(email),
        user::Password::new(password.expose_secret()),
    ) else {
        return Err(AuthError::InvalidCredentials.into());
    };

    let out = ctx
        .service()
        .execute(command::CreateUserSession::ByCredentials {
            email,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map_err(AsError::into_error)?;

    log::info!("`User(id: {})` signed in", out.session.user_id);

    Ok((
        jar.add(cookies.issue(out.token)),
        Redirect::to(out.session.role.home()),
    ))
}

/// Registers a new [`Role::Lecturer`] by the provided [`SignUp`] form and
/// signs it in.
///
/// # Errors
///
/// Errors if the form is invalid or the email is already registered.
pub async fn signup(
    ctx: Context,
    Extension(cookies): Extension<Cookies>,
    jar: CookieJar,
    Form(form): Form<SignUp>,
) -> Result<(CookieJar, Redirect), Error> {
    let (email, password) = required(form.email, form.password)?;

    let name = form
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| user::Name::new(n).ok_or(SignUpError::InvalidName))
        .transpose()?;
    let email = user::Email::new(email).ok_or(SignUpError::InvalidEmail)?;
    let password = user::Password::new(password.expose_secret())
        .ok_or(SignUpError::InvalidPassword)?;

    let user = ctx
        .service()
        .execute(command::CreateUser {
            name,
            email,
            password: SecretBox::new(Box::new(password)),
            role: Role::Lecturer,
        })
        .await
        .map_err(AsError::into_error)?;

    log::info!("`User(id: {})` signed up", user.id);

    let out = ctx
        .service()
        .execute(command::CreateUserSession::ByUserId(user.id))
        .await
        .map_err(AsError::into_error)?;

    Ok((
        jar.add(cookies.issue(out.token)),
        Redirect::to(user.role.home()),
    ))
}

/// Signs the visitor out by removing the session cookie.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn logout(
    Extension(cookies): Extension<Cookies>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    (jar.remove(cookies.removal()), Redirect::to(LOGIN_PATH))
}

/// Ensures both the email and the password are submitted and non-empty.
fn required(
    email: Option<String>,
    password: Option<SecretString>,
) -> Result<(String, SecretString), Error> {
    let email = email.filter(|e| !e.trim().is_empty());
    let password = password.filter(|p| !p.expose_secret().is_empty());
    email
        .zip(password)
        .ok_or_else(|| AuthError::MissingCredentials.into())
}

define_error! {
    enum SignUpError {
        #[code = "INVALID_NAME"]
        #[status = BAD_REQUEST]
        #[message = "Name must be at most 512 characters long"]
        InvalidName,

        #[code = "INVALID_EMAIL"]
        #[status = BAD_REQUEST]
        #[message = "Email is not a valid address"]
        InvalidEmail,

        #[code = "INVALID_PASSWORD"]
        #[status = BAD_REQUEST]
        #[message = "Password must be 8 to 128 characters long"]
        InvalidPassword,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "Email is already registered"]
                EmailOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PasswordHash(_) => None,
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) | Self::UserNotExists(_) => None,
            Self::WrongCredentials => {
                Some(AuthError::InvalidCredentials.into())
            }
        }
    }
}
