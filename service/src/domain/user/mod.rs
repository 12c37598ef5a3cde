//! [`User`] definitions.

pub mod session;

use std::sync::LazyLock;

use argon2::{
    password_hash::{self, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Argon2,
};
#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Debug, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::session::Session;

/// Portal user: a lecturer, a coordinator or a registry staff member.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// Display [`Name`] of this [`User`], if any.
    pub name: Option<Name>,

    /// [`Email`] this [`User`] signs in with.
    pub email: Email,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`Role`] of this [`User`].
    pub role: Role,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Display name of a [`User`].
#[derive(AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Email address of a [`User`], lowercased.
#[derive(AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    ///
    /// Surrounding whitespace is trimmed and the address is lowercased, so
    /// that lookups are case-insensitive.
    #[must_use]
    pub fn new(address: impl AsRef<str>) -> Option<Self> {
        let address = address.as_ref().trim().to_lowercase();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Loose `local@domain.tld` shape; deliverability is not our concern.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 320 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Plain password of a [`User`].
///
/// Only ever held inside a [`secrecy::SecretBox`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[debug("Password(***)")]
pub struct Password(String);

impl Password {
    /// Minimal number of characters of a new [`Password`].
    pub const MIN_LEN: usize = 8;

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let len = password.as_ref().chars().count();
        (Self::MIN_LEN..=128).contains(&len)
    }

    /// Returns the bytes to hash.
    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// [Argon2] hash of a [`Password`], in the [PHC string format].
///
/// [Argon2]: https://wikipedia.org/wiki/Argon2
/// [PHC string format]: https://github.com/P-H-C/phc-string-format
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes the given [`Password`] with a fresh random salt.
    ///
    /// # Errors
    ///
    /// If the OS random source or the hasher fails.
    pub fn new(password: &Password) -> Result<Self, HashError> {
        let mut salt = [0_u8; 16];
        getrandom::getrandom(&mut salt)?;
        let salt = SaltString::encode_b64(&salt)?;
        Ok(Self(
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)?
                .to_string(),
        ))
    }

    /// Returns the [`PasswordHash`] of no [`User`], hashed with the same
    /// parameters as the real ones.
    ///
    /// Verifying against it costs as much as verifying a real [`User`]'s
    /// [`Password`], so a sign-in attempt for an unknown [`Email`] takes as
    /// long as one with a wrong [`Password`].
    #[must_use]
    pub fn dummy() -> &'static Self {
        static DUMMY: LazyLock<PasswordHash> = LazyLock::new(|| {
            PasswordHash::new(&Password("dummy password of no user".into()))
                .expect("hashing a constant password")
        });

        &DUMMY
    }

    /// Checks whether the given [`Password`] matches this [`PasswordHash`].
    ///
    /// A malformed stored hash never matches.
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        password_hash::PasswordHash::new(&self.0).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

/// Error of hashing a [`Password`].
#[derive(Debug, Display, Error, From)]
pub enum HashError {
    /// OS random source failed to provide a salt.
    #[display("Failed to generate salt: {_0}")]
    Random(getrandom::Error),

    /// [`Argon2`] failed to hash.
    #[display("Failed to hash password: {_0}")]
    Argon2(#[error(not(source))] password_hash::Error),
}

define_kind! {
    #[doc = "Role of a [`User`], determining the paths the [`User`] may access."]
    enum Role {
        #[doc = "Registry staff, administering the whole portal."]
        Registry = 1,

        #[doc = "Center coordinator, reviewing claims of lecturers."]
        Coordinator = 2,

        #[doc = "Lecturer, submitting claims."]
        Lecturer = 3,

        #[doc = "Registry clerk without the registry dashboard."]
        StaffRegistry = 4,
    }
}

impl Role {
    /// Returns the path prefix reserved for this [`Role`], if any.
    #[must_use]
    pub const fn path_prefix(self) -> Option<&'static str> {
        match self {
            Self::Registry => Some("/registry"),
            Self::Coordinator => Some("/coordinator"),
            Self::Lecturer => Some("/lecturer"),
            Self::StaffRegistry => None,
        }
    }

    /// Returns the path a [`User`] of this [`Role`] lands on after signing in.
    #[must_use]
    pub const fn home(self) -> &'static str {
        match self.path_prefix() {
            Some(prefix) => prefix,
            None => "/",
        }
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Email, Name, Password, PasswordHash, Role};

    #[test]
    fn normalizes_email() {
        assert_eq!(
            Email::new("  Jane.Doe@Unisa.AC.za ").unwrap().to_string(),
            "jane.doe@unisa.ac.za",
        );
        assert!(Email::new("no-at-sign").is_none());
        assert!(Email::new("two@@signs.com").is_none());
        assert!(Email::new("").is_none());
    }

    #[test]
    fn rejects_untrimmed_name() {
        assert!(Name::new("Jane Doe").is_some());
        assert!(Name::new(" Jane").is_none());
        assert!(Name::new("").is_none());
    }

    #[test]
    fn bounds_password_length() {
        assert!(Password::new("1234567").is_none());
        assert!(Password::new("12345678").is_some());
        assert!(Password::new("x".repeat(129)).is_none());
    }

    #[test]
    fn verifies_only_matching_password() {
        let password = Password::new("correct horse").unwrap();
        let hash = PasswordHash::new(&password).unwrap();

        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::new("battery staple").unwrap()));
    }

    #[test]
    fn salts_every_hash() {
        let password = Password::new("correct horse").unwrap();

        assert_ne!(
            PasswordHash::new(&password).unwrap(),
            PasswordHash::new(&password).unwrap(),
        );
    }

    #[test]
    fn provides_reusable_dummy_hash() {
        let dummy = PasswordHash::dummy();

        assert!(dummy.0.starts_with("$argon2id$"), "{}", dummy.0);
        assert!(std::ptr::eq(dummy, PasswordHash::dummy()));
        assert!(!dummy.verify(&Password::new("correct horse").unwrap()));
    }

    #[test]
    fn maps_role_to_home() {
        assert_eq!(Role::Registry.home(), "/registry");
        assert_eq!(Role::Coordinator.home(), "/coordinator");
        assert_eq!(Role::Lecturer.home(), "/lecturer");
        assert_eq!(Role::StaffRegistry.home(), "/");
    }

    #[test]
    fn stores_role_as_discriminant() {
        assert_eq!(Role::StaffRegistry.u8(), 4);
        assert_eq!(Role::from_u8(2), Some(Role::Coordinator));
        assert_eq!(Role::StaffRegistry.to_string(), "STAFF_REGISTRY");
    }
}
