//! [`Query`] collection related to a single [`MoodEntry`].

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{mood_entry, user, MoodEntry},
    infra::{database, Database},
    Service,
};

use super::Query;

/// Queries a [`MoodEntry`] by its [`mood_entry::Id`] on behalf of its owner.
///
/// Resolves to [`None`] if the [`MoodEntry`] doesn't exist or is owned by
/// another [`User`].
#[derive(Clone, Copy, Debug)]
pub struct ById {
    /// ID of the [`MoodEntry`] to query.
    pub id: mood_entry::Id,

    /// ID of the [`User`] performing the query.
    pub user_id: user::Id,
}

impl<Db> Query<ById> for Service<Db>
where
    Db: Database<
        Select<By<Option<MoodEntry>, mood_entry::Id>>,
        Ok = Option<MoodEntry>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<MoodEntry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        ById { id, user_id }: ById,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .database()
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::wrap!())?
            .filter(|e| e.user_id == user_id))
    }
}
