//! Backend contracts the client flows are written against.
//!
//! Each operation is a [`Backend`] of its own argument type, so a single
//! backend type may serve the identity provider and the document store at
//! once, while a test double implements only the operations it needs.

use common::operations::{By, Delete, Insert, Select, Subscribe, Update};
use derive_more::{Display, Error as StdError};
use futures::stream::LocalBoxStream;
use secrecy::SecretString;

use crate::Session;

pub use service::domain::{mood_entry as entry, user, MoodEntry as Entry};

/// Single backend operation.
pub use common::Handler as Backend;

/// Message shown for any failure caused by an unreachable backend.
pub const NETWORK_MESSAGE: &str = "Network error — check your connection.";

/// Signs in a user with the provided credentials.
#[derive(Clone, Debug)]
pub struct SignIn {
    /// Email of the user.
    pub email: String,

    /// Password of the user.
    pub password: SecretString,
}

/// Registers a new user with the provided credentials.
///
/// Doesn't establish any [`Session`].
#[derive(Clone, Debug)]
pub struct SignUp {
    /// Email of the new user.
    pub email: String,

    /// Password of the new user.
    pub password: SecretString,
}

/// Destroys the current [`Session`], if any.
#[derive(Clone, Copy, Debug)]
pub struct SignOut;

/// Subscribes to the changes of the current [`Session`].
///
/// The current state is delivered first. Dropping the stream unsubscribes.
pub type WatchSession = Subscribe<By<Option<Session>, ()>>;

/// Stream of the current [`Session`] states.
pub type Sessions = LocalBoxStream<'static, Option<Session>>;

/// Creates a new [`Entry`], resolving into its ID.
pub type CreateEntry = Insert<NewEntry>;

/// Fetches a single [`Entry`] by its ID.
pub type FetchEntry = Select<By<Option<Entry>, entry::Id>>;

/// Patches an existing [`Entry`].
pub type PatchEntry = Update<Patch>;

/// Deletes an [`Entry`] by its ID.
pub type DeleteEntry = Delete<By<Entry, entry::Id>>;

/// Subscribes to the [`Snapshot`]s of a user's [`Entry`]s.
///
/// The current [`Snapshot`] is delivered first. Dropping the stream
/// unsubscribes.
pub type WatchEntries = Subscribe<By<Snapshot, user::Id>>;

/// Full result set of a live [`Entry`] subscription at a point in time.
pub type Snapshot = Vec<Entry>;

/// Stream of [`Snapshot`]s.
pub type Snapshots = LocalBoxStream<'static, Result<Snapshot, Error>>;

/// Fields of a new [`Entry`].
///
/// Its `progress` is always `0`, while its ID and creation time are set by
/// the store.
#[derive(Clone, Debug)]
pub struct NewEntry {
    /// ID of the user owning the new [`Entry`].
    pub user_id: user::Id,

    /// Title of the new [`Entry`].
    pub title: entry::Title,

    /// Mood of the new [`Entry`], if any.
    pub mood: Option<entry::Mood>,
}

/// Patch of an existing [`Entry`].
///
/// Only the title and the mood of an [`Entry`] may ever change.
#[derive(Clone, Debug)]
pub struct Patch {
    /// ID of the [`Entry`] to patch.
    pub id: entry::Id,

    /// New title of the [`Entry`].
    pub title: entry::Title,

    /// New mood of the [`Entry`].
    pub mood: entry::Mood,
}

/// Category of a [`SignIn`] failure.
#[derive(Clone, Debug, Display, Eq, PartialEq, StdError)]
pub enum SignInError {
    /// Provided email is not a valid email address.
    #[display("invalid email")]
    InvalidEmail,

    /// No user is registered with the provided email.
    #[display("user not found")]
    UserNotFound,

    /// Provided password doesn't match the user's one.
    #[display("wrong password")]
    WrongPassword,

    /// Backend is unreachable.
    #[display("network failure")]
    Network,

    /// Unclassified failure.
    #[display("{_0}")]
    Other(#[error(not(source))] String),
}

impl SignInError {
    /// Returns the user-facing message of this [`SignInError`].
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "Invalid email address.",
            Self::UserNotFound => "No account found with that email.",
            Self::WrongPassword => "Incorrect password.",
            Self::Network => NETWORK_MESSAGE,
            Self::Other(_) => "Failed to sign in. Please check credentials.",
        }
    }
}

/// Category of a [`SignUp`] failure.
#[derive(Clone, Debug, Display, Eq, PartialEq, StdError)]
pub enum SignUpError {
    /// Provided email is not a valid email address.
    #[display("invalid email")]
    InvalidEmail,

    /// Provided email is already registered.
    #[display("email already in use")]
    EmailInUse,

    /// Provided password is too weak.
    #[display("weak password")]
    WeakPassword,

    /// Backend is unreachable.
    #[display("network failure")]
    Network,

    /// Unclassified failure.
    #[display("{_0}")]
    Other(#[error(not(source))] String),
}

impl SignUpError {
    /// Returns the user-facing message of this [`SignUpError`].
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "Invalid email address.",
            Self::EmailInUse => "An account already exists with that email.",
            Self::WeakPassword => {
                "Password is too weak. Use at least 6 characters."
            }
            Self::Network => NETWORK_MESSAGE,
            Self::Other(_) => "Failed to sign up. Please try again.",
        }
    }
}

/// Failure of any other backend operation.
///
/// Its [`Display`] is the message shown to the user.
///
/// [`Display`]: std::fmt::Display
#[derive(Clone, Debug, Display, Eq, PartialEq, StdError)]
pub enum Error {
    /// Backend is unreachable.
    #[display("{}", NETWORK_MESSAGE)]
    Network,

    /// There is no valid [`Session`].
    #[display("You are not signed in.")]
    Unauthenticated,

    /// The [`Session`] user doesn't own the requested data.
    #[display("You are not allowed to access this mood.")]
    Forbidden,

    /// Requested [`Entry`] doesn't exist.
    #[display("This mood doesn't exist anymore.")]
    NotFound,

    /// Unclassified failure.
    #[display("{_0}")]
    Other(#[error(not(source))] String),
}

#[cfg(test)]
mod spec {
    use super::{Error, SignInError, SignUpError, NETWORK_MESSAGE};

    #[test]
    fn network_failures_share_message() {
        assert_eq!(SignInError::Network.message(), NETWORK_MESSAGE);
        assert_eq!(SignUpError::Network.message(), NETWORK_MESSAGE);
        assert_eq!(Error::Network.to_string(), NETWORK_MESSAGE);
    }

    #[test]
    fn unclassified_failures_fall_back() {
        assert_eq!(
            SignInError::Other("auth/too-many-requests".into()).message(),
            "Failed to sign in. Please check credentials.",
        );
        assert_eq!(
            SignUpError::Other("auth/operation-not-allowed".into()).message(),
            "Failed to sign up. Please try again.",
        );
        assert_eq!(Error::Other("boom".into()).to_string(), "boom");
    }
}
