//! [`Command`] for updating a [`MoodEntry`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{
    mood_entry::{Mood, Title},
    User,
};
use crate::{
    domain::{mood_entry, user, MoodEntry},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating [`Title`] and [`Mood`] of a [`MoodEntry`].
///
/// Other fields of the [`MoodEntry`] are never touched.
#[derive(Clone, Debug)]
pub struct UpdateMoodEntry {
    /// ID of the [`MoodEntry`] to update.
    pub id: mood_entry::Id,

    /// ID of the [`User`] performing the update.
    ///
    /// Must own the [`MoodEntry`].
    pub user_id: user::Id,

    /// New [`Title`] of the [`MoodEntry`].
    pub title: mood_entry::Title,

    /// New [`Mood`] of the [`MoodEntry`].
    pub mood: mood_entry::Mood,
}

impl<Db> Command<UpdateMoodEntry> for Service<Db>
where
    Db: Database<
            Select<By<Option<MoodEntry>, mood_entry::Id>>,
            Ok = Option<MoodEntry>,
            Err = Traced<database::Error>,
        > + Database<Update<MoodEntry>, Err = Traced<database::Error>>,
{
    type Ok = MoodEntry;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateMoodEntry,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateMoodEntry {
            id,
            user_id,
            title,
            mood,
        } = cmd;

        // Foreign entries are indistinguishable from missing ones.
        let mut entry = self
            .database()
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|e| e.user_id == user_id)
            .ok_or(E::MoodEntryNotExists(id))
            .map_err(tracerr::wrap!())?;

        entry.title = title;
        entry.mood = Some(mood);
        self.database()
            .execute(Update(entry.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.feed().publish(user_id);

        Ok(entry)
    }
}

/// Error of [`UpdateMoodEntry`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`MoodEntry`] doesn't exist.
    #[display("`MoodEntry(id: {_0})` does not exist")]
    #[from(ignore)]
    MoodEntryNotExists(#[error(not(source))] mood_entry::Id),
}
