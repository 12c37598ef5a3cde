//! [`Command`] for creating a [`Session`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Email, Password};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Clone, Debug, From)]
pub enum CreateUserSession {
    /// Create a new [`Session`] by [`User`] credentials.
    ByCredentials {
        /// [`Email`] of a [`User`].
        email: user::Email,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },

    /// Create a new [`Session`] for an already authenticated [`User`].
    ByUserId(user::Id),
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] to store in the session cookie.
    pub token: session::Token,

    /// Created [`Session`].
    pub session: Session,

    /// [`DateTime`] when the [`Session`] expires.
    ///
    /// [`DateTime`]: common::DateTime
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let user = match cmd {
            Cmd::ByCredentials { email, password } => {
                let user = self
                    .database()
                    .execute(Select(By::new(&email)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;

                let hash = match &user {
                    Some(u) => &u.password_hash,
                    None => user::PasswordHash::dummy(),
                };
                let verified = hash.verify(password.expose_secret());

                user.filter(|_| verified)
                    .ok_or_else(|| E::WrongCredentials)
                    .map_err(tracerr::wrap!())?
            }
            Cmd::ByUserId(user_id) => self
                .database()
                .execute(Select(By::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        };

        let codec = self.session_codec();
        let session = Session::from(&user);
        let expires_at = codec.expiration_from_now();
        let token = codec
            .encode(&session, expires_at)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        Ok(Output {
            token,
            session,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// Unknown [`Email`] or wrong [`Password`].
    ///
    /// Both cases are reported identically, so that the existence of an
    /// account is not disclosed.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

#[cfg(test)]
mod spec {
    use std::time::{Duration, Instant};

    use secrecy::SecretBox;

    use crate::{
        command::{create_user_session::ExecutionError, CreateUser},
        domain::user::{self, Role},
        infra::database::memory,
        Command as _,
    };

    use super::CreateUserSession;

    fn password(raw: &str) -> SecretBox<user::Password> {
        SecretBox::new(Box::new(user::Password::new(raw).unwrap()))
    }

    fn email(raw: &str) -> user::Email {
        user::Email::new(raw).unwrap()
    }

    #[tokio::test]
    async fn issues_decodable_session_for_valid_credentials() {
        let service = memory::service();
        let user = service
            .execute(CreateUser {
                name: user::Name::new("Sipho Dlamini"),
                email: email("sipho@unisa.ac.za"),
                password: password("s3cret-pass"),
                role: Role::Coordinator,
            })
            .await
            .unwrap();

        let out = service
            .execute(CreateUserSession::ByCredentials {
                email: email("SIPHO@unisa.ac.za"),
                password: password("s3cret-pass"),
            })
            .await
            .unwrap();

        assert_eq!(out.session.user_id, user.id);
        assert_eq!(out.session.role, Role::Coordinator);
        assert_eq!(out.session.name, user.name);
        assert_eq!(
            service.session_codec().decode(out.token.as_ref()),
            Some(out.session),
        );
    }

    #[tokio::test]
    async fn reports_unknown_email_and_wrong_password_alike() {
        let service = memory::service();
        drop(
            service
                .execute(CreateUser {
                    name: None,
                    email: email("lecturer@unisa.ac.za"),
                    password: password("right-password"),
                    role: Role::Lecturer,
                })
                .await
                .unwrap(),
        );

        let unknown = service
            .execute(CreateUserSession::ByCredentials {
                email: email("nobody@unisa.ac.za"),
                password: password("right-password"),
            })
            .await
            .unwrap_err();
        let wrong = service
            .execute(CreateUserSession::ByCredentials {
                email: email("lecturer@unisa.ac.za"),
                password: password("wrong-password"),
            })
            .await
            .unwrap_err();

        assert!(matches!(unknown.as_ref(), ExecutionError::WrongCredentials));
        assert!(matches!(wrong.as_ref(), ExecutionError::WrongCredentials));
        assert_eq!(unknown.as_ref().to_string(), wrong.as_ref().to_string());
    }

    #[tokio::test]
    async fn spends_comparable_time_on_unknown_email_and_wrong_password() {
        let service = memory::service();
        drop(
            service
                .execute(CreateUser {
                    name: None,
                    email: email("lecturer@unisa.ac.za"),
                    password: password("right-password"),
                    role: Role::Lecturer,
                })
                .await
                .unwrap(),
        );
        // Warm up the lazily hashed dummy.
        _ = user::PasswordHash::dummy();

        let mut unknown = Duration::ZERO;
        let mut wrong = Duration::ZERO;
        for _ in 0..3 {
            let started = Instant::now();
            drop(
                service
                    .execute(CreateUserSession::ByCredentials {
                        email: email("nobody@unisa.ac.za"),
                        password: password("wrong-password"),
                    })
                    .await
                    .unwrap_err(),
            );
            unknown += started.elapsed();

            let started = Instant::now();
            drop(
                service
                    .execute(CreateUserSession::ByCredentials {
                        email: email("lecturer@unisa.ac.za"),
                        password: password("wrong-password"),
                    })
                    .await
                    .unwrap_err(),
            );
            wrong += started.elapsed();
        }

        assert!(unknown * 4 >= wrong, "{unknown:?} vs {wrong:?}");
        assert!(wrong * 4 >= unknown, "{unknown:?} vs {wrong:?}");
    }

    #[tokio::test]
    async fn creates_session_by_user_id() {
        let service = memory::service();
        let user = service
            .execute(CreateUser {
                name: None,
                email: email("registry@unisa.ac.za"),
                password: password("registry-pass"),
                role: Role::Registry,
            })
            .await
            .unwrap();

        let out = service
            .execute(CreateUserSession::ByUserId(user.id))
            .await
            .unwrap();

        assert_eq!(out.session.email, user.email);
        assert_eq!(out.session.role, Role::Registry);
        assert!(out.expires_at > crate::domain::user::session::ExpirationDateTime::now());
    }

    #[tokio::test]
    async fn fails_for_missing_user_id() {
        let service = memory::service();
        let id = user::Id::new();

        let err = service
            .execute(CreateUserSession::ByUserId(id))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(missing) if *missing == id,
        ));
    }
}
