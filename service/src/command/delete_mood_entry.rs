//! [`Command`] for deleting a [`MoodEntry`].

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{mood_entry, user, MoodEntry},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`MoodEntry`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteMoodEntry {
    /// ID of the [`MoodEntry`] to delete.
    pub id: mood_entry::Id,

    /// ID of the [`User`] performing the deletion.
    ///
    /// Must own the [`MoodEntry`].
    pub user_id: user::Id,
}

impl<Db> Command<DeleteMoodEntry> for Service<Db>
where
    Db: Database<
            Select<By<Option<MoodEntry>, mood_entry::Id>>,
            Ok = Option<MoodEntry>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<MoodEntry, mood_entry::Id>>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = MoodEntry;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteMoodEntry,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteMoodEntry { id, user_id } = cmd;

        let entry = self
            .database()
            .execute(Select(By::<Option<MoodEntry>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|e| e.user_id == user_id)
            .ok_or(E::MoodEntryNotExists(id))
            .map_err(tracerr::wrap!())?;

        self.database()
            .execute(Delete(By::<MoodEntry, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.feed().publish(user_id);

        Ok(entry)
    }
}

/// Error of [`DeleteMoodEntry`] [`Command`] execution.
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

#[cfg(test)]
mod spec {
    use crate::{
        command::CreateMoodEntry,
        domain::{mood_entry, user},
        in_memory,
        query::mood_entries,
        Command as _, Query as _,
    };

    use super::{DeleteMoodEntry, ExecutionError};

    #[tokio::test]
    async fn deletes_only_own_entries() {
        let svc = in_memory();
        let owner = user::Id::new();
        let created = svc
            .execute(CreateMoodEntry {
                user_id: owner,
                title: mood_entry::Title::default(),
                mood: None,
            })
            .await
            .unwrap();

        let err = svc
            .execute(DeleteMoodEntry {
                id: created.id,
                user_id: user::Id::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::MoodEntryNotExists(_),
        ));

        let deleted = svc
            .execute(DeleteMoodEntry {
                id: created.id,
                user_id: owner,
            })
            .await
            .unwrap();
        assert_eq!(deleted, created);

        let left = svc
            .execute(mood_entries::ByOwner::by(owner))
            .await
            .unwrap();
        assert!(left.is_empty());
    }
}
