//! Session cookie reading and writing.

use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use service::domain::user::{session, Session};

/// Name of the cookie carrying the encoded [`Session`].
pub const COOKIE_NAME: &str = "app_session";

/// Resolves the current [`Session`] out of the request `headers`.
///
/// A missing, expired, tampered or otherwise undecodable cookie resolves to
/// [`None`], so the request is handled as an anonymous one.
#[must_use]
pub fn resolve(
    headers: &http::HeaderMap,
    codec: &session::Codec,
) -> Option<Session> {
    codec.decode(CookieJar::from_headers(headers).get(COOKIE_NAME)?.value())
}

/// Factory of session [`Cookie`]s.
#[derive(Clone, Copy, Debug)]
pub struct Cookies {
    /// `Max-Age` of issued [`Cookie`]s.
    max_age: Duration,

    /// Whether issued [`Cookie`]s are restricted to HTTPS.
    secure: bool,
}

impl Cookies {
    /// Creates a new [`Cookies`] factory.
    #[must_use]
    pub const fn new(max_age: Duration, secure: bool) -> Self {
        Self { max_age, secure }
    }

    /// Creates a [`Cookie`] storing the provided [`session::Token`].
    #[must_use]
    pub fn issue(&self, token: session::Token) -> Cookie<'static> {
        let mut cookie = Cookie::build((COOKIE_NAME, String::from(token)))
            .http_only(true)
            .secure(self.secure)
            .path("/")
            .same_site(SameSite::Lax);
        if let Ok(max_age) = time::Duration::try_from(self.max_age) {
            cookie = cookie.max_age(max_age);
        }
        cookie.build()
    }

    /// Creates a [`Cookie`] matching the issued ones, to be removed from a
    /// [`CookieJar`].
    #[must_use]
    pub fn removal(&self) -> Cookie<'static> {
        Cookie::build(COOKIE_NAME)
            .http_only(true)
            .secure(self.secure)
            .path("/")
            .same_site(SameSite::Lax)
            .build()
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use axum_extra::extract::cookie::SameSite;
    use service::domain::user::{self, session, Role, Session};

    use super::{resolve, Cookies, COOKIE_NAME};

    fn codec() -> session::Codec {
        session::Codec::new(b"resolver-secret", Duration::from_secs(60))
    }

    fn session() -> Session {
        Session {
            user_id: user::Id::new(),
            email: user::Email::new("lecturer@unisa.ac.za").unwrap(),
            name: user::Name::new("Thandi Mokoena"),
            role: Role::Lecturer,
        }
    }

    fn headers(cookie: &str) -> http::HeaderMap {
        let mut headers = http::HeaderMap::new();
        drop(headers.insert(
            http::header::COOKIE,
            http::HeaderValue::from_str(cookie).unwrap(),
        ));
        headers
    }

    #[test]
    fn resolves_session_from_cookie() {
        let codec = codec();
        let session = session();
        let token = codec
            .encode(&session, codec.expiration_from_now())
            .unwrap();

        let resolved = resolve(
            &headers(&format!("theme=dark; {COOKIE_NAME}={token}")),
            &codec,
        );

        assert_eq!(resolved, Some(session));
    }

    #[test]
    fn resolves_anonymous_without_cookie() {
        assert_eq!(resolve(&http::HeaderMap::new(), &codec()), None);
        assert_eq!(resolve(&headers("theme=dark"), &codec()), None);
    }

    #[test]
    fn resolves_anonymous_from_malformed_cookie() {
        assert_eq!(
            resolve(&headers(&format!("{COOKIE_NAME}=not-a-session")), &codec()),
            None,
        );
        assert_eq!(
            resolve(&headers(&format!("{COOKIE_NAME}=")), &codec()),
            None,
        );
    }

    #[test]
    fn issues_hardened_cookie() {
        let cookies = Cookies::new(Duration::from_secs(7 * 24 * 60 * 60), true);

        let cookie = cookies.issue(user::session::Token::new("abc.def.ghi"));

        assert_eq!(cookie.name(), COOKIE_NAME);
        assert_eq!(cookie.value(), "abc.def.ghi");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(7 * 24 * 60 * 60)),
        );
    }
}
