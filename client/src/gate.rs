//! Session [`Gate`] of the protected area.

use std::convert::Infallible;

use common::operations::{By, Subscribe};
use futures::StreamExt as _;

use crate::{
    backend::{Backend, Sessions, WatchSession},
    Navigation, Navigator, Route, Session,
};

/// State of a [`Gate`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum State {
    /// No session state has been delivered yet.
    ///
    /// Loading indicator is shown and no navigation happens.
    Pending,

    /// Protected area is revealed for the [`Session`].
    Revealed(Session),

    /// There is no [`Session`], so the user was redirected to sign in.
    Redirected,
}

/// Gate revealing the protected area to authenticated users only.
///
/// Holds exactly one session listener for its whole lifetime and releases it
/// on drop.
#[derive(derive_more::Debug)]
pub struct Gate<N> {
    /// Listener of the [`Session`] changes.
    #[debug(skip)]
    sessions: Sessions,

    /// [`Navigator`] performing the redirects.
    navigator: N,

    /// Current [`State`] of this [`Gate`].
    state: State,
}

impl<N: Navigator> Gate<N> {
    /// Mounts a new [`Gate`], registering its session listener.
    pub async fn mount<B>(backend: &B, navigator: N) -> Self
    where
        B: Backend<WatchSession, Ok = Sessions, Err = Infallible>,
    {
        let sessions = backend
            .execute(Subscribe(By::new(())))
            .await
            .unwrap_or_else(|e| match e {});
        Self {
            sessions,
            navigator,
            state: State::Pending,
        }
    }

    /// Returns the current [`State`] of this [`Gate`].
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Returns the [`Session`] the protected area is revealed for, if any.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            State::Revealed(s) => Some(s),
            State::Pending | State::Redirected => None,
        }
    }

    /// Awaits the next session state delivery and reacts on it.
    ///
    /// Every delivered absent session redirects to sign in, not only the
    /// first one.
    ///
    /// Returns [`None`] once the identity provider stops delivering.
    pub async fn next(&mut self) -> Option<&State> {
        let session = self.sessions.next().await?;
        self.state = if let Some(session) = session {
            tracing::debug!(user.id = %session.user_id, "session revealed");
            State::Revealed(session)
        } else {
            tracing::debug!("no session, redirecting to sign in");
            self.navigator.navigate(Navigation::Replace(Route::SignIn));
            State::Redirected
        };
        Some(&self.state)
    }
}
