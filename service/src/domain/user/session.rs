//! [`Session`] definitions.

use std::time::Duration;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Debug, Display, Into};
use jsonwebtoken::{errors::ErrorKind, DecodingKey, EncodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing as log;

use crate::domain::user::{self, Role, User};

/// Signed-in [`User`] identity, carried by the session cookie.
///
/// The cookie is the only copy of a [`Session`]: nothing is persisted
/// server-side, so a [`Session`] ends either on expiration or when the cookie
/// is cleared.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    pub user_id: user::Id,

    /// [`user::Email`] of the [`User`].
    pub email: user::Email,

    /// [`user::Name`] of the [`User`], if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<user::Name>,

    /// [`Role`] of the [`User`].
    pub role: Role,
}

impl From<&User> for Session {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Encoded [`Session`], as stored in the session cookie.
#[derive(AsRef, Clone, Debug, Display, Eq, Into, PartialEq)]
#[as_ref(str)]
pub struct Token(String);

impl Token {
    /// Wraps a raw cookie value into a [`Token`].
    ///
    /// Nothing is checked here: an invalid [`Token`] is detected by
    /// [`Codec::decode()`].
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

/// Claims of a [JWT] carrying a [`Session`].
///
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(Deserialize, Serialize)]
struct Claims {
    /// Carried [`Session`].
    #[serde(flatten)]
    session: Session,

    /// [`DateTime`] when the [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    expires_at: ExpirationDateTime,
}

/// Codec converting [`Session`]s to and from [`Token`]s.
///
/// A [`Token`] is an HS256-signed [JWT], so a tampered, foreign or expired
/// cookie never decodes into a [`Session`].
///
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(Clone, Debug)]
pub struct Codec {
    #[debug(skip)]
    encoding_key: EncodingKey,

    #[debug(skip)]
    decoding_key: DecodingKey,

    /// How long an issued [`Session`] stays valid.
    lifetime: Duration,
}

impl Codec {
    /// Default [`Session`] lifetime: one week.
    pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    /// Creates a new [`Codec`] signing with the provided `secret`.
    #[must_use]
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime,
        }
    }

    /// Returns how long an issued [`Session`] stays valid.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Returns the [`ExpirationDateTime`] of a [`Session`] issued right now.
    #[must_use]
    pub fn expiration_from_now(&self) -> ExpirationDateTime {
        ExpirationDateTime::now() + self.lifetime
    }

    /// Encodes the provided [`Session`] into a [`Token`] valid until
    /// `expires_at`.
    ///
    /// # Errors
    ///
    /// If the [`Session`] cannot be serialized or signed.
    pub fn encode(
        &self,
        session: &Session,
        expires_at: ExpirationDateTime,
    ) -> Result<Token, jsonwebtoken::errors::Error> {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &Claims {
                session: session.clone(),
                expires_at,
            },
            &self.encoding_key,
        )
        .map(Token)
    }

    /// Decodes the [`Session`] carried by the provided `token`.
    ///
    /// [`None`] is returned for any malformed, tampered or expired `token`.
    #[must_use]
    pub fn decode(&self, token: &str) -> Option<Session> {
        match jsonwebtoken::decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::default(),
        ) {
            Ok(data) => Some(data.claims.session),
            Err(e) => {
                if matches!(e.kind(), ErrorKind::ExpiredSignature) {
                    log::debug!("session cookie expired");
                } else {
                    log::warn!("discarding malformed session cookie: {e}");
                }
                None
            }
        }
    }
}
