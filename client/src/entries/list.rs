//! Live [`List`] of the signed-in user's [`Entry`]s.

use std::cell::{Cell, RefCell};

use common::operations::{By, Delete, Subscribe};
use futures::StreamExt as _;
use time::UtcOffset;

use crate::{
    backend::{
        entry, user, Backend, DeleteEntry, Entry, Error, SignOut, Snapshots,
        WatchEntries,
    },
    entries::Row,
    form::InFlight,
    Navigation, Navigator, Notice, Route, Session, Submission,
};
#[cfg(doc)]
use crate::backend::Snapshot;

/// State of a [`List`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum State {
    /// There was no [`Session`] on mount, so nothing is ever shown.
    Idle,

    /// The first [`Snapshot`] hasn't been delivered yet.
    Loading,

    /// The last delivered [`Snapshot`], newest [`Entry`] first.
    Synced(Vec<Entry>),

    /// The last delivered [`Snapshot`] has no [`Entry`]s.
    Empty,

    /// Subscription has failed with the provided message.
    ///
    /// Nothing is delivered anymore until [`List::retry()`].
    Failed(String),
}

/// Confirmation prompt of an [`Entry`] deletion.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Confirmation {
    /// ID of the [`Entry`] to delete.
    pub id: entry::Id,
}

impl Confirmation {
    /// Title of the prompt.
    pub const TITLE: &'static str = "Delete mood";

    /// Message of the prompt.
    pub const MESSAGE: &'static str =
        "Are you sure you want to delete this Mood log?";

    /// Label of the button closing the prompt.
    pub const CANCEL: &'static str = "Cancel";

    /// Label of the button confirming the deletion.
    pub const CONFIRM: &'static str = "Delete";
}

/// Live list of the signed-in user's [`Entry`]s.
///
/// Holds at most one live subscription, released on drop.
#[derive(derive_more::Debug)]
pub struct List<B, N> {
    /// Document store to subscribe to.
    backend: B,

    /// [`Navigator`] to leave this [`List`] with.
    navigator: N,

    /// ID of the user whose [`Entry`]s are listed.
    owner: Option<user::Id>,

    /// Live subscription to the owner's [`Entry`]s.
    #[debug(skip)]
    snapshots: Option<Snapshots>,

    /// Current [`State`] of this [`List`].
    state: State,

    /// Open deletion prompt, if any.
    prompt: Cell<Option<Confirmation>>,

    /// Blocking [`Notice`] to show, if any.
    notice: RefCell<Option<Notice>>,

    /// Outstanding deletion flag.
    deleting: InFlight,
}

impl<B, N> List<B, N> {
    /// Placeholder shown for the [`State::Empty`].
    pub const PLACEHOLDER: &'static str = "Heyyy — tell me your mood. Add one!";

    /// Returns the current [`State`] of this [`List`].
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Returns the [`Row`]s to display to a viewer at the provided
    /// [`UtcOffset`].
    #[must_use]
    pub fn rows(&self, offset: UtcOffset) -> Vec<Row> {
        match &self.state {
            State::Synced(entries) => {
                entries.iter().map(|e| Row::new(e, offset)).collect()
            }
            State::Idle | State::Loading | State::Empty | State::Failed(_) => {
                vec![]
            }
        }
    }

    /// Returns the placeholder to display instead of the [`Row`]s, if any.
    #[must_use]
    pub fn placeholder(&self) -> Option<&'static str> {
        matches!(self.state, State::Empty).then_some(Self::PLACEHOLDER)
    }

    /// Indicates whether this [`List`] holds a live subscription.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.snapshots.is_some()
    }

    /// Opens the deletion prompt of the [`Entry`] with the provided ID.
    pub fn request_delete(&self, id: entry::Id) {
        self.prompt.set(Some(Confirmation { id }));
    }

    /// Returns the open deletion prompt, if any.
    #[must_use]
    pub fn prompt(&self) -> Option<Confirmation> {
        self.prompt.get()
    }

    /// Closes the deletion prompt without deleting anything.
    pub fn cancel_delete(&self) {
        self.prompt.set(None);
    }

    /// Returns the blocking [`Notice`] to show, if any.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        self.notice.borrow().clone()
    }

    /// Dismisses the shown [`Notice`].
    pub fn dismiss_notice(&self) {
        drop(self.notice.borrow_mut().take());
    }

    /// Awaits the next [`Snapshot`] delivery and applies it.
    ///
    /// Every [`Snapshot`] replaces the whole list. A failed delivery drops
    /// the subscription and moves to [`State::Failed`].
    ///
    /// Returns [`None`] if there is no live subscription anymore.
    pub async fn next(&mut self) -> Option<&State> {
        let owner = self.owner?;
        let delivery = self.snapshots.as_mut()?.next().await;

        match delivery {
            Some(Ok(mut entries)) => {
                let total = entries.len();
                entries.retain(|e| e.user_id == owner);
                if entries.len() != total {
                    tracing::warn!(
                        user.id = %owner,
                        "filtered out {} foreign mood entries",
                        total - entries.len(),
                    );
                }
                entries.sort_unstable_by(|a, b| {
                    (b.created_at, b.id).cmp(&(a.created_at, a.id))
                });

                self.state = if entries.is_empty() {
                    State::Empty
                } else {
                    State::Synced(entries)
                };
            }
            Some(Err(e)) => {
                tracing::error!(
                    user.id = %owner,
                    "mood entries subscription failed: {e}",
                );
                self.snapshots = None;
                self.state = State::Failed(e.to_string());
            }
            None => {
                self.snapshots = None;
                return None;
            }
        }
        Some(&self.state)
    }
}

impl<B, N> List<B, N>
where
    B: Backend<WatchEntries, Ok = Snapshots, Err = Error>,
{
    /// Mounts a new [`List`] of the provided [`Session`]'s [`Entry`]s.
    ///
    /// Without a [`Session`] the [`List`] stays [`State::Idle`] forever.
    pub async fn mount(
        backend: B,
        navigator: N,
        session: Option<&Session>,
    ) -> Self {
        let mut list = Self {
            backend,
            navigator,
            owner: session.map(|s| s.user_id),
            snapshots: None,
            state: State::Idle,
            prompt: Cell::new(None),
            notice: RefCell::new(None),
            deleting: InFlight::default(),
        };
        list.subscribe().await;
        list
    }

    /// Replaces the current subscription with a new one.
    pub async fn retry(&mut self) {
        self.subscribe().await;
    }

    /// Subscribes to the owner's [`Entry`]s, dropping the previous
    /// subscription first.
    async fn subscribe(&mut self) {
        let Some(owner) = self.owner else {
            return;
        };
        self.snapshots = None;
        self.state = State::Loading;

        match self.backend.execute(Subscribe(By::new(owner))).await {
            Ok(snapshots) => {
                tracing::debug!(user.id = %owner, "subscribed to mood entries");
                self.snapshots = Some(snapshots);
            }
            Err(e) => {
                tracing::error!(
                    user.id = %owner,
                    "failed to subscribe to mood entries: {e}",
                );
                self.state = State::Failed(e.to_string());
            }
        }
    }
}

impl<B, N> List<B, N>
where
    B: Backend<DeleteEntry, Ok = Entry, Err = Error>,
{
    /// Deletes the [`Entry`] of the open deletion prompt.
    ///
    /// The [`Entry`] stays listed until the next [`Snapshot`] arrives. A
    /// failed deletion shows a blocking [`Notice`].
    pub async fn confirm_delete(&self) -> Submission {
        let Some(_guard) = self.deleting.start() else {
            return Submission::Ignored;
        };
        let Some(Confirmation { id }) = self.prompt.take() else {
            return Submission::Ignored;
        };

        match self.backend.execute(Delete(By::new(id))).await {
            Ok(_) => {
                tracing::info!(entry.id = %id, "mood entry deleted");
                Submission::Succeeded
            }
            Err(e) => {
                tracing::warn!(entry.id = %id, "failed to delete: {e}");
                *self.notice.borrow_mut() = Some(Notice::error(e.to_string()));
                Submission::Failed
            }
        }
    }
}

impl<B, N> List<B, N>
where
    B: Backend<SignOut, Ok = (), Err = Error>,
    N: Navigator,
{
    /// Signs the current user out and leaves to [`Route::Home`], whose
    /// [`Gate`] then redirects to sign in.
    ///
    /// [`Gate`]: crate::Gate
    ///
    /// A failed [`SignOut`] shows a blocking [`Notice`].
    pub async fn sign_out(&self) -> Submission {
        match self.backend.execute(SignOut).await {
            Ok(()) => {
                self.navigator.navigate(Navigation::Replace(Route::Home));
                Submission::Succeeded
            }
            Err(e) => {
                tracing::warn!("failed to sign out: {e}");
                *self.notice.borrow_mut() = Some(Notice {
                    title: "Logout failed",
                    message: e.to_string(),
                });
                Submission::Failed
            }
        }
    }
}

impl<B, N: Navigator> List<B, N> {
    /// Opens the [`Creator`] of a new [`Entry`].
    ///
    /// [`Creator`]: crate::entries::Creator
    pub fn go_to_create(&self) {
        self.navigator.navigate(Navigation::Push(Route::CreateEntry));
    }
}
