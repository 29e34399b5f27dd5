//! [`Editor`] of existing [`Entry`]s.

use std::cell::{Cell, RefCell};

use common::operations::{By, Select, Update};

use crate::{
    backend::{entry, Backend, Entry, Error, FetchEntry, Patch, PatchEntry},
    form::InFlight,
    Navigation, Navigator, Notice, Route, Submission,
};

/// Form changing the title and the mood of an existing [`Entry`].
#[derive(Debug)]
pub struct Editor<B, N> {
    /// Document store to write to.
    backend: B,

    /// [`Navigator`] to leave this form with.
    navigator: N,

    /// ID of the edited [`Entry`].
    id: entry::Id,

    /// Entered title.
    title: RefCell<String>,

    /// Selected mood.
    mood: Cell<Option<entry::Mood>>,

    /// Blocking [`Notice`] to show, if any.
    notice: RefCell<Option<Notice>>,

    /// Outstanding submission flag.
    in_flight: InFlight,
}

impl<B, N> Editor<B, N> {
    /// Moods to pick from along with their emojis and labels.
    pub const MOODS: [(entry::Mood, &'static str, &'static str); 3] = [
        (entry::Mood::Happy, "😊", "happy"),
        (entry::Mood::Sad, "😞", "sad"),
        (entry::Mood::NotWell, "🤒", "not_well"),
    ];

    /// Returns the ID of the edited [`Entry`].
    #[must_use]
    pub fn id(&self) -> entry::Id {
        self.id
    }

    /// Sets the entered title.
    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.borrow_mut() = title.into();
    }

    /// Returns the entered title.
    #[must_use]
    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    /// Selects the provided mood.
    pub fn select_mood(&self, mood: entry::Mood) {
        self.mood.set(Some(mood));
    }

    /// Returns the selected mood, if any.
    #[must_use]
    pub fn mood(&self) -> Option<entry::Mood> {
        self.mood.get()
    }

    /// Indicates whether the submit affordance is enabled.
    ///
    /// Requires a selected mood.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.mood.get().is_some() && !self.in_flight.is_set()
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

impl<B, N> Editor<B, N>
where
    B: Backend<FetchEntry, Ok = Option<Entry>, Err = Error>,
    N: Navigator,
{
    /// Loads the [`Entry`] with the provided ID into a new [`Editor`].
    ///
    /// Returns to [`Route::Entries`] if the [`Entry`] cannot be loaded.
    pub async fn load(
        backend: B,
        navigator: N,
        id: entry::Id,
    ) -> Option<Self> {
        match backend.execute(Select(By::new(id))).await {
            Ok(Some(entry)) => Some(Self {
                backend,
                navigator,
                id,
                title: RefCell::new(entry.title.to_string()),
                mood: Cell::new(entry.mood),
                notice: RefCell::new(None),
                in_flight: InFlight::default(),
            }),
            Ok(None) => {
                tracing::debug!(entry.id = %id, "mood entry not found");
                navigator.navigate(Navigation::Replace(Route::Entries));
                None
            }
            Err(e) => {
                tracing::warn!(entry.id = %id, "failed to load: {e}");
                navigator.navigate(Navigation::Replace(Route::Entries));
                None
            }
        }
    }
}

impl<B, N> Editor<B, N>
where
    B: Backend<PatchEntry, Ok = Entry, Err = Error>,
    N: Navigator,
{
    /// Saves the entered title and the selected mood.
    ///
    /// Successful save opens [`Route::Entries`], while a failed one keeps the
    /// form and shows a blocking [`Notice`].
    pub async fn submit(&self) -> Submission {
        let Some(_guard) = self.in_flight.start() else {
            return Submission::Ignored;
        };
        let Some(mood) = self.mood.get() else {
            return Submission::Ignored;
        };
        let title = self.title.borrow().clone();
        let Some(title) = entry::Title::new(title) else {
            *self.notice.borrow_mut() = Some(Notice::error(format!(
                "Mood can't be longer than {} characters.",
                entry::Title::MAX_LENGTH,
            )));
            return Submission::Rejected;
        };

        match self
            .backend
            .execute(Update(Patch {
                id: self.id,
                title,
                mood,
            }))
            .await
        {
            Ok(_) => {
                tracing::info!(entry.id = %self.id, "mood entry updated");
                self.navigator.navigate(Navigation::Push(Route::Entries));
                Submission::Succeeded
            }
            Err(e) => {
                tracing::warn!(entry.id = %self.id, "failed to update: {e}");
                *self.notice.borrow_mut() = Some(Notice::error(e.to_string()));
                Submission::Failed
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use std::cell::Cell;

    use common::{
        operations::{By, Insert, Select, Update},
        DateTime, Handler,
    };

    use crate::{
        backend::{entry, user, Entry, Error, NewEntry, Patch, SignOut},
        test, Navigation, Navigator as _, Notice, Route, Stack, Submission,
    };

    use super::Editor;

    /// Document store holding a single entry and patching it after a single
    /// yield.
    #[derive(Debug)]
    struct Slow {
        entry: Entry,
        calls: Cell<usize>,
    }

    impl Slow {
        fn new() -> Self {
            Self {
                entry: Entry {
                    id: entry::Id::new(),
                    user_id: user::Id::new(),
                    title: entry::Title::new("meh").expect("valid title"),
                    mood: Some(entry::Mood::Sad),
                    progress: 0,
                    created_at: DateTime::now().coerce(),
                },
                calls: Cell::new(0),
            }
        }
    }

    impl Handler<Select<By<Option<Entry>, entry::Id>>> for Slow {
        type Ok = Option<Entry>;
        type Err = Error;

        async fn execute(
            &self,
            Select(by): Select<By<Option<Entry>, entry::Id>>,
        ) -> Result<Option<Entry>, Error> {
            Ok((by.into_inner() == self.entry.id).then(|| self.entry.clone()))
        }
    }

    impl Handler<Update<Patch>> for Slow {
        type Ok = Entry;
        type Err = Error;

        async fn execute(
            &self,
            Update(patch): Update<Patch>,
        ) -> Result<Entry, Error> {
            self.calls.set(self.calls.get() + 1);
            tokio::task::yield_now().await;
            Ok(Entry {
                title: patch.title,
                mood: Some(patch.mood),
                ..self.entry.clone()
            })
        }
    }

    #[tokio::test]
    async fn leaves_when_entry_is_missing() {
        let local = test::local();
        _ = test::sign_in(&local, "a@b.com").await;
        let id = entry::Id::new();
        let stack = Stack::new(Route::Entries);
        stack.navigate(Navigation::Push(Route::EditEntry(id)));

        let editor = Editor::load(&local, &stack, id).await;

        assert!(editor.is_none());
        assert_eq!(stack.routes(), [Route::Entries, Route::Entries]);
    }

    #[tokio::test]
    async fn updates_title_and_mood() {
        let local = test::local();
        let session = test::sign_in(&local, "a@b.com").await;
        let id = local
            .execute(Insert(NewEntry {
                user_id: session.user_id,
                title: entry::Title::new("ok").expect("valid title"),
                mood: None,
            }))
            .await
            .expect("created");
        let stack = Stack::new(Route::Entries);

        let editor = Editor::load(&local, &stack, id).await.expect("loaded");
        assert_eq!(editor.id(), id);
        assert_eq!(editor.title(), "ok");
        assert_eq!(editor.mood(), None);
        assert!(!editor.can_submit());
        assert_eq!(editor.submit().await, Submission::Ignored);

        editor.set_title("better now");
        editor.select_mood(entry::Mood::Happy);
        assert!(editor.can_submit());
        assert_eq!(editor.submit().await, Submission::Succeeded);
        assert_eq!(stack.routes(), [Route::Entries, Route::Entries]);

        let updated = local
            .execute(Select(By::<Option<Entry>, _>::new(id)))
            .await
            .expect("fetched")
            .expect("exists");
        assert_eq!(updated.title.to_string(), "better now");
        assert_eq!(updated.mood, Some(entry::Mood::Happy));
        assert_eq!(updated.progress, 0);
    }

    #[tokio::test]
    async fn keeps_form_on_failure() {
        let local = test::local();
        let session = test::sign_in(&local, "a@b.com").await;
        let id = local
            .execute(Insert(NewEntry {
                user_id: session.user_id,
                title: entry::Title::new("sad").expect("valid title"),
                mood: Some(entry::Mood::Sad),
            }))
            .await
            .expect("created");
        let stack = Stack::new(Route::Entries);
        let editor = Editor::load(&local, &stack, id).await.expect("loaded");

        local.execute(SignOut).await.expect("signed out");
        editor.set_title("sadder");
        assert_eq!(editor.submit().await, Submission::Failed);

        assert_eq!(editor.title(), "sadder");
        assert_eq!(editor.mood(), Some(entry::Mood::Sad));
        assert_eq!(
            editor.notice(),
            Some(Notice::error("You are not signed in.")),
        );
        assert_eq!(stack.routes(), [Route::Entries]);
    }

    #[tokio::test]
    async fn ignores_duplicate_submissions() {
        let backend = Slow::new();
        let stack = Stack::new(Route::Entries);
        let editor = Editor::load(&backend, &stack, backend.entry.id)
            .await
            .expect("loaded");
        editor.select_mood(entry::Mood::Happy);
        assert!(editor.can_submit());

        let (first, second) = futures::join!(editor.submit(), async {
            assert!(!editor.can_submit());
            editor.submit().await
        });

        assert_eq!(first, Submission::Succeeded);
        assert_eq!(second, Submission::Ignored);
        assert_eq!(backend.calls.get(), 1);
        assert!(editor.can_submit());
        assert_eq!(stack.routes(), [Route::Entries, Route::Entries]);
    }

    #[test]
    fn offers_every_mood() {
        let moods = Editor::<(), ()>::MOODS.map(|(m, _, _)| m);

        assert_eq!(moods.as_slice(), entry::Mood::ALL);
        for (mood, _, label) in Editor::<(), ()>::MOODS {
            assert_eq!(mood.to_string(), label);
        }
    }
}
