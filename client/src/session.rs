//! [`Session`] definitions.

use service::domain::user::{self, session};

/// Authenticated identity of the current user, as tracked by the identity
/// provider.
///
/// Flows never read it globally: it's injected into them on construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Session {
    /// ID of the authenticated user.
    pub user_id: user::Id,

    /// Access token of this [`Session`].
    pub token: session::Token,

    /// Moment this [`Session`] expires at.
    pub expires_at: session::ExpirationDateTime,
}
