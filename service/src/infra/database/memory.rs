//! In-memory [`Database`] implementation.

use std::{collections::HashMap, sync::Arc};

use common::operations::{By, Delete, Insert, Select, Update};
use derive_more::{Display, Error as StdError};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::{
    domain::{mood_entry, user, MoodEntry, User},
    infra::{
        database::{self, constraint},
        Database,
    },
};

/// In-memory [`Database`], shared between its clones.
///
/// Mirrors the constraints of the Postgres schema, so it's a drop-in
/// replacement for tests and local runs.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<RwLock<Tables>>);

/// Tables of a [`Memory`] database.
#[derive(Debug, Default)]
struct Tables {
    /// Stored [`User`]s.
    users: HashMap<user::Id, User>,

    /// Stored [`MoodEntry`]s.
    mood_entries: HashMap<mood_entry::Id, MoodEntry>,
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Unique constraint is violated.
    #[display("Unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        match self {
            Self::UniqueViolation(c) => *c == constraint,
        }
    }
}

/// Wraps the provided [`Error`] into a traced [`database::Error`].
fn fail(e: Error) -> Traced<database::Error> {
    tracerr::new!(database::Error::from(e))
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.users.get(&by.into_inner()).cloned())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Email>>>
    for Memory
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email: &str = by.into_inner().as_ref();
        Ok(self
            .0
            .read()
            .await
            .users
            .values()
            .find(|u| {
                AsRef::<str>::as_ref(&u.email).eq_ignore_ascii_case(email)
            })
            .cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut tables = self.0.write().await;

        if tables.users.contains_key(&user.id) {
            return Err(fail(Error::UniqueViolation(
                constraint::USERS_PKEY,
            )));
        }
        let email: &str = user.email.as_ref();
        if tables.users.values().any(|u| {
            AsRef::<str>::as_ref(&u.email).eq_ignore_ascii_case(email)
        }) {
            return Err(fail(Error::UniqueViolation(
                constraint::USERS_EMAIL_KEY,
            )));
        }

        drop(tables.users.insert(user.id, user));
        Ok(())
    }
}

impl Database<Select<By<Option<MoodEntry>, mood_entry::Id>>>
    for Memory
{
    type Ok = Option<MoodEntry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<MoodEntry>, mood_entry::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .0
            .read()
            .await
            .mood_entries
            .get(&by.into_inner())
            .cloned())
    }
}

impl Database<Select<By<Vec<MoodEntry>, user::Id>>> for Memory {
    type Ok = Vec<MoodEntry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<MoodEntry>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner = by.into_inner();
        let mut entries = self
            .0
            .read()
            .await
            .mood_entries
            .values()
            .filter(|e| e.user_id == owner)
            .cloned()
            .collect::<Vec<_>>();
        entries.sort_unstable_by(|a, b| {
            (b.created_at, b.id).cmp(&(a.created_at, a.id))
        });
        Ok(entries)
    }
}

impl Database<Insert<MoodEntry>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<MoodEntry>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut tables = self.0.write().await;

        if tables.mood_entries.contains_key(&entry.id) {
            return Err(fail(Error::UniqueViolation(
                constraint::MOOD_ENTRIES_PKEY,
            )));
        }

        drop(tables.mood_entries.insert(entry.id, entry));
        Ok(())
    }
}

impl Database<Update<MoodEntry>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(entry): Update<MoodEntry>,
    ) -> Result<Self::Ok, Self::Err> {
        let MoodEntry {
            id, title, mood, ..
        } = entry;

        if let Some(stored) = self.0.write().await.mood_entries.get_mut(&id) {
            stored.title = title;
            stored.mood = mood;
        }
        Ok(())
    }
}

impl Database<Delete<By<MoodEntry, mood_entry::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<MoodEntry, mood_entry::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.0.write().await.mood_entries.remove(&by.into_inner()));
        Ok(())
    }
}
