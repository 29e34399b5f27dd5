//! [`Command`] for creating a new [`MoodEntry`].

use common::{operations::Insert, DateTime};
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

/// [`Command`] for creating a new [`MoodEntry`].
#[derive(Clone, Debug)]
pub struct CreateMoodEntry {
    /// ID of the [`User`] owning a new [`MoodEntry`].
    pub user_id: user::Id,

    /// [`Title`] of a new [`MoodEntry`].
    pub title: mood_entry::Title,

    /// [`Mood`] of a new [`MoodEntry`].
    pub mood: Option<mood_entry::Mood>,
}

impl<Db> Command<CreateMoodEntry> for Service<Db>
where
    Db: Database<Insert<MoodEntry>, Err = Traced<database::Error>>,
{
    type Ok = MoodEntry;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateMoodEntry,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateMoodEntry {
            user_id,
            title,
            mood,
        } = cmd;

        let entry = MoodEntry {
            id: mood_entry::Id::new(),
            user_id,
            title,
            mood,
            progress: 0,
            created_at: DateTime::now().coerce(),
        };

        self.database()
            .execute(Insert(entry.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.feed().publish(user_id);

        Ok(entry)
    }
}

/// Error of [`CreateMoodEntry`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::{mood_entry, user, MoodEntry},
        in_memory,
        infra::Database as _,
        Command as _,
    };

    use super::CreateMoodEntry;

    #[tokio::test]
    async fn stores_entry_and_notifies_owner() {
        let svc = in_memory();
        let mut feed = svc.feed().subscribe();
        let user_id = user::Id::new();

        let entry = svc
            .execute(CreateMoodEntry {
                user_id,
                title: mood_entry::Title::new("😊 Happy").unwrap(),
                mood: Some(mood_entry::Mood::Happy),
            })
            .await
            .unwrap();

        assert_eq!(entry.progress, 0);
        assert_eq!(feed.try_recv().unwrap(), user_id);
        let stored = svc
            .database()
            .execute(Select(By::<Option<MoodEntry>, _>::new(entry.id)))
            .await
            .unwrap();
        assert_eq!(stored, Some(entry));
    }
}
