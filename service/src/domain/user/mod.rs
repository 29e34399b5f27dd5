//! [`User`] definitions.

pub mod session;

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::session::Session;

/// Person signed up in Moodify.
#[derive(Clone, Debug)]
pub struct User {
    /// Unique ID of this [`User`].
    pub id: Id,

    /// [`Email`] this [`User`] signs in with.
    pub email: Email,

    /// Hash of the [`Password`] this [`User`] signs in with.
    pub password_hash: PasswordHash,

    /// [`DateTime`] when this [`User`] signed up.
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
    /// Generates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Uuid::new_v4().into()
    }
}

/// Plain password of a [`User`], never printed.
///
/// Holds from [`Password::MIN_LENGTH`] to [`Password::MAX_LENGTH`]
/// characters.
#[derive(Debug)]
pub struct Password(SecretString);

impl Password {
    /// Fewest characters a [`Password`] may have.
    pub const MIN_LENGTH: usize = 6;

    /// Most characters a [`Password`] may have.
    pub const MAX_LENGTH: usize = 128;

    /// Wraps the provided `password`, unless it's too short or too long.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        let len = password.chars().count();
        (Self::MIN_LENGTH..=Self::MAX_LENGTH)
            .contains(&len)
            .then(|| Self(password.into()))
    }
}

/// [PHC string] of a [`Password`] hashed with [Argon2].
///
/// [Argon2]: https://en.wikipedia.org/wiki/Argon2
/// [PHC string]: https://github.com/P-H-C/phc-string-format
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes the provided [`Password`] with a random salt.
    #[must_use]
    pub fn new(password: &Password) -> Self {
        Self(password_auth::generate_hash(password.0.expose_secret()))
    }

    /// Tells whether the provided [`Password`] is the hashed one.
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        password_auth::verify_password(password.0.expose_secret(), &self.0)
            .is_ok()
    }
}

/// Email address a [`User`] signs in with.
///
/// Kept trimmed and lowercased, so addresses differing only in case belong to
/// the same [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Normalizes the provided `address`, unless it doesn't look like an
    /// email address.
    #[must_use]
    pub fn new(address: impl AsRef<str>) -> Option<Self> {
        /// Local part, `@`, and a domain having at least one dot.
        static FORMAT: LazyLock<Option<Regex>> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").ok()
        });

        let address = address.as_ref().trim().to_lowercase();
        FORMAT
            .as_ref()
            .is_some_and(|re| re.is_match(&address))
            .then_some(Self(address))
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("not an email address")
    }
}

/// [`DateTime`] when a [`User`] signed up.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Email, Password, PasswordHash};

    #[test]
    fn password_length_is_bounded() {
        assert!(Password::new("").is_none());
        assert!(Password::new("12345").is_none());
        assert!(Password::new("secret").is_some());
        assert!(Password::new("пароль").is_some());
        assert!(Password::new("x".repeat(128)).is_some());
        assert!(Password::new("x".repeat(129)).is_none());
    }

    #[test]
    fn password_is_not_printed() {
        let password = Password::new("secret1").unwrap();

        assert!(!format!("{password:?}").contains("secret1"));
    }

    #[test]
    fn password_hash_verifies_only_its_password() {
        let password = Password::new("secret1").unwrap();
        let hash = PasswordHash::new(&password);

        assert_ne!(hash.to_string(), "secret1");
        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::new("secret2").unwrap()));
    }

    #[test]
    fn email_is_normalized() {
        let email = Email::new("  John.Doe@Example.ORG ").unwrap();

        assert_eq!(email.to_string(), "john.doe@example.org");
        assert_eq!(email, Email::new("john.doe@example.org").unwrap());
    }

    #[test]
    fn email_format() {
        assert!(Email::new("a@b.com").is_some());
        assert!(Email::new("a+tag@mail.b.co").is_some());
        assert!(Email::new("").is_none());
        assert!(Email::new("not-an-email").is_none());
        assert!(Email::new("a@").is_none());
        assert!(Email::new("a@b").is_none());
        assert!(Email::new("a b@c.com").is_none());
        assert!(Email::new("a@@b.com").is_none());
    }
}
