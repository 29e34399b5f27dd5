//! [`Query`] collection related to multiple [`MoodEntry`]s.

use std::convert::Infallible;

use common::operations::By;
use futures::{
    future,
    stream::{self, BoxStream},
    StreamExt as _,
};
use tokio_stream::wrappers::{
    errors::BroadcastStreamRecvError, BroadcastStream,
};

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{user, MoodEntry},
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries all the [`MoodEntry`]s owned by a [`User`], newest first.
pub type ByOwner = DatabaseQuery<By<Vec<MoodEntry>, user::Id>>;

/// Queries a stream of ticks, each meaning that [`MoodEntry`]s of a [`User`]
/// should be (re-)fetched.
///
/// The first tick is emitted immediately, and then one after each committed
/// change of the [`User`]'s [`MoodEntry`]s. A subscriber lagging behind the
/// changes gets a single tick for all the missed ones.
#[derive(Clone, Copy, Debug)]
pub struct Changes {
    /// ID of the [`User`] owning the watched [`MoodEntry`]s.
    pub owner: user::Id,
}

impl<Db> Query<Changes> for Service<Db> {
    type Ok = BoxStream<'static, ()>;
    type Err = Infallible;

    async fn execute(
        &self,
        Changes { owner }: Changes,
    ) -> Result<Self::Ok, Self::Err> {
        // Subscribe before the initial tick, so no change is missed between
        // the initial fetch and the first notification.
        let changes = BroadcastStream::new(self.feed().subscribe())
            .filter_map(move |res| {
                future::ready(match res {
                    Ok(id) => (id == owner).then_some(()),
                    Err(BroadcastStreamRecvError::Lagged(n)) => {
                        tracing::debug!(
                            user.id = %owner,
                            "lagged behind {n} `MoodEntry` changes",
                        );
                        Some(())
                    }
                })
            });

        Ok(stream::once(future::ready(())).chain(changes).boxed())
    }
}

#[cfg(test)]
mod spec {
    use futures::{FutureExt as _, StreamExt as _};

    use crate::{
        command::{CreateMoodEntry, DeleteMoodEntry},
        domain::{mood_entry, user},
        in_memory, Command as _, Query as _,
    };

    use super::{ByOwner, Changes};

    fn create(user_id: user::Id, title: &str) -> CreateMoodEntry {
        CreateMoodEntry {
            user_id,
            title: mood_entry::Title::new(title).unwrap(),
            mood: mood_entry::Mood::guess(title),
        }
    }

    #[tokio::test]
    async fn lists_own_entries_newest_first() {
        let svc = in_memory();
        let (alice, bob) = (user::Id::new(), user::Id::new());
        drop(svc.execute(create(alice, "happy")).await.unwrap());
        drop(svc.execute(create(bob, "sad")).await.unwrap());
        drop(svc.execute(create(alice, "sick")).await.unwrap());

        let entries = svc.execute(ByOwner::by(alice)).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.user_id == alice));
        assert!(entries.windows(2).all(|w| {
            (w[0].created_at, w[0].id) > (w[1].created_at, w[1].id)
        }));
    }

    #[tokio::test]
    async fn ticks_only_on_owner_changes() {
        let svc = in_memory();
        let (alice, bob) = (user::Id::new(), user::Id::new());
        let mut ticks =
            svc.execute(Changes { owner: alice }).await.unwrap();

        assert_eq!(ticks.next().now_or_never(), Some(Some(())));
        assert_eq!(ticks.next().now_or_never(), None);

        drop(svc.execute(create(bob, "sad")).await.unwrap());
        assert_eq!(ticks.next().now_or_never(), None);

        let entry = svc.execute(create(alice, "happy")).await.unwrap();
        assert_eq!(ticks.next().now_or_never(), Some(Some(())));

        drop(
            svc.execute(DeleteMoodEntry {
                id: entry.id,
                user_id: alice,
            })
            .await
            .unwrap(),
        );
        assert_eq!(ticks.next().now_or_never(), Some(Some(())));
    }
}
