//! [`Creator`] of new [`Entry`]s.

use std::cell::RefCell;

use common::operations::Insert;

#[cfg(doc)]
use crate::backend::Entry;
use crate::{
    backend::{entry, user, Backend, Error, NewEntry},
    form::InFlight,
    Navigation, Navigator, Notice, Route, Session, Submission,
};

/// Form logging a new [`Entry`] from free text.
#[derive(Debug)]
pub struct Creator<B, N> {
    /// Document store to write to.
    backend: B,

    /// [`Navigator`] to leave this form with.
    navigator: N,

    /// ID of the user owning the created [`Entry`]s.
    owner: Option<user::Id>,

    /// Entered text.
    text: RefCell<String>,

    /// Blocking [`Notice`] to show, if any.
    notice: RefCell<Option<Notice>>,

    /// Outstanding submission flag.
    in_flight: InFlight,
}

impl<B, N> Creator<B, N> {
    /// Creates a new empty [`Creator`] for the provided [`Session`].
    #[must_use]
    pub fn new(backend: B, navigator: N, session: Option<&Session>) -> Self {
        Self {
            backend,
            navigator,
            owner: session.map(|s| s.user_id),
            text: RefCell::default(),
            notice: RefCell::new(None),
            in_flight: InFlight::default(),
        }
    }

    /// Sets the entered text.
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.borrow_mut() = text.into();
    }

    /// Returns the entered text.
    #[must_use]
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    /// Indicates whether the submit affordance is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.in_flight.is_set()
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
}

impl<B, N> Creator<B, N>
where
    B: Backend<Insert<NewEntry>, Ok = entry::Id, Err = Error>,
    N: Navigator,
{
    /// Logs the entered text as a new [`Entry`] with a guessed mood.
    ///
    /// Blank text or a missing [`Session`] is silently ignored. Successful
    /// creation clears the input and opens [`Route::Entries`], while a failed
    /// one keeps the input and shows a blocking [`Notice`].
    pub async fn submit(&self) -> Submission {
        let Some(_guard) = self.in_flight.start() else {
            return Submission::Ignored;
        };
        let Some(user_id) = self.owner else {
            tracing::debug!("no session, ignoring new mood entry");
            return Submission::Ignored;
        };

        let text = self.text.borrow().clone();
        if text.trim().is_empty() {
            return Submission::Ignored;
        }
        let mood = entry::Mood::guess(&text);
        let Some(title) = entry::Title::new(text) else {
            *self.notice.borrow_mut() = Some(Notice::error(format!(
                "Mood can't be longer than {} characters.",
                entry::Title::MAX_LENGTH,
            )));
            return Submission::Rejected;
        };

        match self
            .backend
            .execute(Insert(NewEntry {
                user_id,
                title,
                mood,
            }))
            .await
        {
            Ok(id) => {
                tracing::info!(entry.id = %id, "mood entry created");
                self.text.borrow_mut().clear();
                self.navigator.navigate(Navigation::Push(Route::Entries));
                Submission::Succeeded
            }
            Err(e) => {
                tracing::warn!("failed to create mood entry: {e}");
                *self.notice.borrow_mut() = Some(Notice::error(e.to_string()));
                Submission::Failed
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use std::cell::Cell;

    use common::{operations::Insert, Handler};
    use service::query;

    use crate::{
        backend::{entry, Error, NewEntry, SignOut},
        test, Notice, Route, Stack, Submission,
    };

    use super::Creator;

    /// Document store accepting every new entry after a single yield.
    #[derive(Debug, Default)]
    struct Slow {
        calls: Cell<usize>,
    }

    impl Handler<Insert<NewEntry>> for Slow {
        type Ok = entry::Id;
        type Err = Error;

        async fn execute(
            &self,
            _: Insert<NewEntry>,
        ) -> Result<entry::Id, Error> {
            self.calls.set(self.calls.get() + 1);
            tokio::task::yield_now().await;
            Ok(entry::Id::new())
        }
    }

    #[tokio::test]
    async fn creates_entry_with_guessed_mood() {
        let local = test::local();
        let session = test::sign_in(&local, "a@b.com").await;
        let stack = Stack::new(Route::CreateEntry);
        let creator = Creator::new(&local, &stack, Some(&session));

        creator.set_text("Feeling sick today");
        assert_eq!(creator.submit().await, Submission::Succeeded);

        assert_eq!(creator.text(), "");
        assert_eq!(stack.routes(), [Route::CreateEntry, Route::Entries]);
        let entries = local
            .service()
            .execute(query::mood_entries::ByOwner::by(session.user_id))
            .await
            .expect("listed");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title.to_string(), "Feeling sick today");
        assert_eq!(entries[0].mood, Some(entry::Mood::NotWell));
        assert_eq!(entries[0].progress, 0);
        assert_eq!(entries[0].user_id, session.user_id);
    }

    #[tokio::test]
    async fn ignores_blank_text_and_missing_session() {
        let backend = Slow::default();
        let stack = Stack::default();

        let creator = Creator::new(&backend, &stack, None);
        creator.set_text("happy");
        assert_eq!(creator.submit().await, Submission::Ignored);

        let local = test::local();
        let session = test::sign_in(&local, "a@b.com").await;
        let creator = Creator::new(&backend, &stack, Some(&session));
        creator.set_text("   ");
        assert_eq!(creator.submit().await, Submission::Ignored);

        assert_eq!(backend.calls.get(), 0);
        assert_eq!(stack.routes(), [Route::Home]);
    }

    #[tokio::test]
    async fn rejects_too_long_text() {
        let backend = Slow::default();
        let stack = Stack::default();
        let local = test::local();
        let session = test::sign_in(&local, "a@b.com").await;
        let creator = Creator::new(&backend, &stack, Some(&session));

        creator.set_text("a".repeat(entry::Title::MAX_LENGTH + 1));

        assert_eq!(creator.submit().await, Submission::Rejected);
        assert!(creator.notice().is_some());
        assert_eq!(backend.calls.get(), 0);
    }

    #[tokio::test]
    async fn ignores_duplicate_submissions() {
        let backend = Slow::default();
        let stack = Stack::default();
        let local = test::local();
        let session = test::sign_in(&local, "a@b.com").await;
        let creator = Creator::new(&backend, &stack, Some(&session));
        creator.set_text("happy");

        let (first, second) = futures::join!(creator.submit(), async {
            assert!(!creator.can_submit());
            creator.submit().await
        });

        assert_eq!(first, Submission::Succeeded);
        assert_eq!(second, Submission::Ignored);
        assert_eq!(backend.calls.get(), 1);
        assert!(creator.can_submit());
    }

    #[tokio::test]
    async fn keeps_input_on_failure() {
        let local = test::local();
        let session = test::sign_in(&local, "a@b.com").await;
        let stack = Stack::new(Route::CreateEntry);
        let creator = Creator::new(&local, &stack, Some(&session));
        local.execute(SignOut).await.expect("signed out");

        creator.set_text("sad");
        assert_eq!(creator.submit().await, Submission::Failed);

        assert_eq!(creator.text(), "sad");
        assert_eq!(
            creator.notice(),
            Some(Notice::error("You are not signed in.")),
        );
        assert_eq!(stack.routes(), [Route::CreateEntry]);

        creator.dismiss_notice();
        assert_eq!(creator.notice(), None);
    }
}
