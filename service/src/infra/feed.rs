//! [`Feed`] of committed changes.

use tokio::sync::broadcast;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::{MoodEntry, User};

/// Process-local feed notifying about committed [`MoodEntry`] changes.
///
/// Carries only the ID of the [`User`] whose [`MoodEntry`]s have changed, so
/// subscribers re-query the actual data themselves.
#[derive(Clone, Debug)]
pub struct Feed(broadcast::Sender<user::Id>);

impl Feed {
    /// Number of notifications a lagging subscriber may miss before it is
    /// notified about the lag.
    pub const CAPACITY: usize = 256;

    /// Notifies all the current subscribers about changed [`MoodEntry`]s of
    /// the provided [`User`].
    pub fn publish(&self, owner: user::Id) {
        // No subscribers is not an error.
        _ = self.0.send(owner);
    }

    /// Subscribes to all the future notifications of this [`Feed`].
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<user::Id> {
        self.0.subscribe()
    }

    /// Returns the number of the current subscribers of this [`Feed`].
    #[must_use]
    pub fn subscribers(&self) -> usize {
        self.0.receiver_count()
    }
}

impl Default for Feed {
    fn default() -> Self {
        Self(broadcast::channel(Self::CAPACITY).0)
    }
}
