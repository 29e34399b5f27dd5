//! [`Database`]-related implementations.

#[cfg(any(test, feature = "memory"))]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(any(test, feature = "memory"))]
pub use self::memory::Memory;
#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

pub mod constraint {
    //! Names of the unique constraints every [`Database`] upholds.
    //!
    //! [`Database`]: super::Database

    /// Primary key of `users`.
    pub const USERS_PKEY: &str = "users_pkey";

    /// Case-insensitive uniqueness of `users.email`.
    pub const USERS_EMAIL_KEY: &str = "users_email_key";

    /// Primary key of `mood_entries`.
    pub const MOOD_ENTRIES_PKEY: &str = "mood_entries_pkey";
}

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(any(test, feature = "memory"))]
    /// [`Memory`] error.
    Memory(memory::Error),

    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),
}

impl Error {
    /// Checks if the error is a violation of the specified unique constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        match self {
            #[cfg(any(test, feature = "memory"))]
            Self::Memory(e) => e.is_unique_violation(constraint),
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => e.is_unique_violation(Some(constraint)),
        }
    }
}
