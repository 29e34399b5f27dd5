//! In-process [`Backend`] over the domain [`Service`].

use std::convert::Infallible;

use common::operations::{By, Delete, Insert, Select, Subscribe, Update};
use futures::StreamExt as _;
use service::{
    command::{
        self, AuthorizeUserSession, CreateMoodEntry, CreateUser,
        CreateUserSession, DeleteMoodEntry, UpdateMoodEntry,
    },
    domain::{self, User},
    infra::database,
    query, Command as _, Service,
};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracerr::Traced;

use crate::{
    backend::{
        entry, user, Backend, Entry, Error, NewEntry, Patch, Sessions,
        SignIn, SignInError, SignOut, SignUp, SignUpError, Snapshot,
        Snapshots,
    },
    Session,
};

/// [`Backend`] executing every operation right in the current process.
///
/// Plays both roles at once: the identity provider keeping the current
/// [`Session`], and the document store of [`Entry`]s. Every [`Entry`]
/// operation is authorized with the current [`Session`] token, so it's
/// rejected with [`Error::Unauthenticated`] once the [`Session`] expires.
#[derive(Debug)]
pub struct Local<Db> {
    /// Domain [`Service`] performing the operations.
    service: Service<Db>,

    /// Current [`Session`], if any.
    session: watch::Sender<Option<Session>>,
}

impl<Db> Local<Db> {
    /// Creates a new [`Local`] backend without any [`Session`].
    #[must_use]
    pub fn new(service: Service<Db>) -> Self {
        Self {
            service,
            session: watch::channel(None).0,
        }
    }

    /// Returns the domain [`Service`] of this [`Local`] backend.
    #[must_use]
    pub fn service(&self) -> &Service<Db> {
        &self.service
    }

    /// Returns the current [`Session`], if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    /// Returns the number of the registered [`Session`] listeners.
    #[must_use]
    pub fn session_listeners(&self) -> usize {
        self.session.receiver_count()
    }

    /// Drops the current [`Session`], notifying all its listeners.
    fn forget_session(&self) {
        if self.session.send_replace(None).is_some() {
            tracing::info!("session dropped");
        }
    }
}

impl Local<service::infra::Memory> {
    /// Creates a new [`Local`] backend over an empty in-memory database.
    #[must_use]
    pub fn in_memory(config: service::Config) -> Self {
        Self::new(Service::new(config, service::infra::Memory::default()))
    }
}

impl<Db> Local<Db>
where
    Service<Db>: service::Command<
        AuthorizeUserSession,
        Ok = domain::user::Session,
        Err = Traced<command::authorize_user_session::ExecutionError>,
    >,
{
    /// Authorizes the current [`Session`], returning its user ID.
    ///
    /// Drops the current [`Session`] if it's no longer valid.
    async fn authorize(&self) -> Result<user::Id, Error> {
        use command::authorize_user_session::ExecutionError as E;

        let token = self
            .session
            .borrow()
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(Error::Unauthenticated)?;

        match self.service.execute(AuthorizeUserSession { token }).await {
            Ok(session) => Ok(session.user_id),
            Err(e) => match e.as_ref() {
                E::Expired
                | E::JsonWebTokenDecodeError(_)
                | E::UserNotExists(_) => {
                    tracing::info!("session is no longer valid: {e}");
                    self.forget_session();
                    Err(Error::Unauthenticated)
                }
                E::Db(_) => Err(other(&e)),
            },
        }
    }

    /// Authorizes the current [`Session`], ensuring that it belongs to the
    /// provided `owner`.
    async fn authorize_as(&self, owner: user::Id) -> Result<(), Error> {
        let user_id = self.authorize().await?;
        if user_id == owner {
            Ok(())
        } else {
            tracing::warn!(
                user.id = %user_id,
                owner.id = %owner,
                "access to foreign mood entries denied",
            );
            Err(Error::Forbidden)
        }
    }
}

/// Converts an unclassified failure into an [`Error::Other`].
fn other(e: &impl std::fmt::Display) -> Error {
    tracing::error!("backend operation failed: {e}");
    Error::Other(e.to_string())
}

impl<Db> Backend<SignIn> for Local<Db>
where
    Service<Db>: service::Command<
        CreateUserSession,
        Ok = command::create_user_session::Output,
        Err = Traced<command::create_user_session::ExecutionError>,
    >,
{
    type Ok = Session;
    type Err = SignInError;

    async fn execute(
        &self,
        SignIn { email, password }: SignIn,
    ) -> Result<Self::Ok, Self::Err> {
        use command::create_user_session::ExecutionError as E;

        let output = self
            .service
            .execute(CreateUserSession { email, password })
            .await
            .map_err(|e| match e.as_ref() {
                E::InvalidEmail => SignInError::InvalidEmail,
                E::UserNotFound(_) => SignInError::UserNotFound,
                E::WrongPassword => SignInError::WrongPassword,
                E::Db(_) | E::JsonWebTokenEncodeError(_) => {
                    tracing::error!("failed to create session: {e}");
                    SignInError::Other(e.to_string())
                }
            })?;

        let session = Session {
            user_id: output.user.id,
            token: output.token,
            expires_at: output.expires_at,
        };
        _ = self.session.send_replace(Some(session.clone()));
        Ok(session)
    }
}

impl<Db> Backend<SignUp> for Local<Db>
where
    Service<Db>: service::Command<
        CreateUser,
        Ok = User,
        Err = Traced<command::create_user::ExecutionError>,
    >,
{
    type Ok = ();
    type Err = SignUpError;

    async fn execute(
        &self,
        SignUp { email, password }: SignUp,
    ) -> Result<Self::Ok, Self::Err> {
        use command::create_user::ExecutionError as E;

        let user = self
            .service
            .execute(CreateUser { email, password })
            .await
            .map_err(|e| match e.as_ref() {
                E::InvalidEmail => SignUpError::InvalidEmail,
                E::EmailOccupied(_) => SignUpError::EmailInUse,
                E::WeakPassword => SignUpError::WeakPassword,
                E::Db(_) => {
                    tracing::error!("failed to create user: {e}");
                    SignUpError::Other(e.to_string())
                }
            })?;

        tracing::info!(user.id = %user.id, "user registered");
        Ok(())
    }
}

impl<Db> Backend<SignOut> for Local<Db> {
    type Ok = ();
    type Err = Error;

    async fn execute(&self, _: SignOut) -> Result<Self::Ok, Self::Err> {
        self.forget_session();
        Ok(())
    }
}

impl<Db> Backend<Subscribe<By<Option<Session>, ()>>> for Local<Db> {
    type Ok = Sessions;
    type Err = Infallible;

    async fn execute(
        &self,
        _: Subscribe<By<Option<Session>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(WatchStream::new(self.session.subscribe()).boxed_local())
    }
}

impl<Db> Backend<Insert<NewEntry>> for Local<Db>
where
    Service<Db>: service::Command<
            AuthorizeUserSession,
            Ok = domain::user::Session,
            Err = Traced<command::authorize_user_session::ExecutionError>,
        > + service::Command<
            CreateMoodEntry,
            Ok = Entry,
            Err = Traced<command::create_mood_entry::ExecutionError>,
        >,
{
    type Ok = entry::Id;
    type Err = Error;

    async fn execute(
        &self,
        Insert(new): Insert<NewEntry>,
    ) -> Result<Self::Ok, Self::Err> {
        let NewEntry {
            user_id,
            title,
            mood,
        } = new;
        self.authorize_as(user_id).await?;

        self.service
            .execute(CreateMoodEntry {
                user_id,
                title,
                mood,
            })
            .await
            .map(|e| e.id)
            .map_err(|e| other(&e))
    }
}

impl<Db> Backend<Select<By<Option<Entry>, entry::Id>>> for Local<Db>
where
    Service<Db>: service::Command<
            AuthorizeUserSession,
            Ok = domain::user::Session,
            Err = Traced<command::authorize_user_session::ExecutionError>,
        > + service::Query<
            query::mood_entry::ById,
            Ok = Option<Entry>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<Entry>;
    type Err = Error;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Entry>, entry::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = self.authorize().await?;

        self.service
            .execute(query::mood_entry::ById {
                id: by.into_inner(),
                user_id,
            })
            .await
            .map_err(|e| other(&e))
    }
}

impl<Db> Backend<Update<Patch>> for Local<Db>
where
    Service<Db>: service::Command<
            AuthorizeUserSession,
            Ok = domain::user::Session,
            Err = Traced<command::authorize_user_session::ExecutionError>,
        > + service::Command<
            UpdateMoodEntry,
            Ok = Entry,
            Err = Traced<command::update_mood_entry::ExecutionError>,
        >,
{
    type Ok = Entry;
    type Err = Error;

    async fn execute(
        &self,
        Update(patch): Update<Patch>,
    ) -> Result<Self::Ok, Self::Err> {
        use command::update_mood_entry::ExecutionError as E;

        let user_id = self.authorize().await?;
        let Patch { id, title, mood } = patch;

        self.service
            .execute(UpdateMoodEntry {
                id,
                user_id,
                title,
                mood,
            })
            .await
            .map_err(|e| match e.as_ref() {
                E::MoodEntryNotExists(_) => Error::NotFound,
                E::Db(_) => other(&e),
            })
    }
}

impl<Db> Backend<Delete<By<Entry, entry::Id>>> for Local<Db>
where
    Service<Db>: service::Command<
            AuthorizeUserSession,
            Ok = domain::user::Session,
            Err = Traced<command::authorize_user_session::ExecutionError>,
        > + service::Command<
            DeleteMoodEntry,
            Ok = Entry,
            Err = Traced<command::delete_mood_entry::ExecutionError>,
        >,
{
    type Ok = Entry;
    type Err = Error;

    async fn execute(
        &self,
        Delete(by): Delete<By<Entry, entry::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        use command::delete_mood_entry::ExecutionError as E;

        let user_id = self.authorize().await?;

        self.service
            .execute(DeleteMoodEntry {
                id: by.into_inner(),
                user_id,
            })
            .await
            .map_err(|e| match e.as_ref() {
                E::MoodEntryNotExists(_) => Error::NotFound,
                E::Db(_) => other(&e),
            })
    }
}

impl<Db> Backend<Subscribe<By<Snapshot, user::Id>>> for Local<Db>
where
    Service<Db>: Clone
        + service::Command<
            AuthorizeUserSession,
            Ok = domain::user::Session,
            Err = Traced<command::authorize_user_session::ExecutionError>,
        > + service::Query<
            query::mood_entries::ByOwner,
            Ok = Snapshot,
            Err = Traced<database::Error>,
        > + 'static,
{
    type Ok = Snapshots;
    type Err = Error;

    async fn execute(
        &self,
        Subscribe(by): Subscribe<By<Snapshot, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        use command::authorize_user_session::ExecutionError as E;

        let owner = by.into_inner();
        self.authorize_as(owner).await?;

        let sessions = self.session.subscribe();
        let service = self.service.clone();
        let changes = service
            .execute(query::mood_entries::Changes { owner })
            .await
            .unwrap_or_else(|e| match e {});

        // Every snapshot is re-authorized, as the session may be switched or
        // expire while the subscription lives.
        Ok(changes
            .then(move |()| {
                let service = service.clone();
                let token = sessions
                    .borrow()
                    .as_ref()
                    .filter(|s| s.user_id == owner)
                    .map(|s| s.token.clone());
                async move {
                    let token = token.ok_or(Error::Unauthenticated)?;
                    let authorized =
                        service.execute(AuthorizeUserSession { token }).await;
                    if let Err(e) = authorized {
                        return Err(match e.as_ref() {
                            E::Expired
                            | E::JsonWebTokenDecodeError(_)
                            | E::UserNotExists(_) => Error::Unauthenticated,
                            E::Db(_) => other(&e),
                        });
                    }
                    service
                        .execute(query::mood_entries::ByOwner::by(owner))
                        .await
                        .map_err(|e| other(&e))
                }
            })
            .boxed_local())
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Delete, Insert, Select, Subscribe, Update},
        Handler as _,
    };
    use futures::{FutureExt as _, StreamExt as _};
    use service::command::CreateMoodEntry;

    use crate::{
        backend::{entry, Entry, Error, NewEntry, Patch, SignOut, Snapshot},
        test,
    };

    fn new_entry(user_id: crate::backend::user::Id, title: &str) -> NewEntry {
        NewEntry {
            user_id,
            title: entry::Title::new(title).expect("valid title"),
            mood: entry::Mood::guess(title),
        }
    }

    #[tokio::test]
    async fn requires_session() {
        let local = test::local();
        let alice = test::sign_in(&local, "a@b.com").await;
        local.execute(SignOut).await.expect("signed out");

        let err = local
            .execute(Insert(new_entry(alice.user_id, "happy")))
            .await
            .unwrap_err();
        assert_eq!(err, Error::Unauthenticated);

        let err = local
            .execute(Subscribe(By::<Snapshot, _>::new(alice.user_id)))
            .await
            .err();
        assert_eq!(err, Some(Error::Unauthenticated));
    }

    #[tokio::test]
    async fn isolates_users() {
        let local = test::local();
        let alice = test::sign_in(&local, "a@b.com").await;
        let id = local
            .execute(Insert(new_entry(alice.user_id, "happy")))
            .await
            .expect("created");

        let bob = test::sign_in(&local, "c@d.com").await;

        let err = local
            .execute(Insert(new_entry(alice.user_id, "sad")))
            .await
            .unwrap_err();
        assert_eq!(err, Error::Forbidden);

        let err = local
            .execute(Subscribe(By::<Snapshot, _>::new(alice.user_id)))
            .await
            .err();
        assert_eq!(err, Some(Error::Forbidden));

        let found = local
            .execute(Select(By::<Option<_>, _>::new(id)))
            .await
            .expect("fetched");
        assert_eq!(found, None);

        let err = local
            .execute(Update(Patch {
                id,
                title: entry::Title::default(),
                mood: entry::Mood::Sad,
            }))
            .await
            .unwrap_err();
        assert_eq!(err, Error::NotFound);

        let err = local
            .execute(Delete(By::<Entry, _>::new(id)))
            .await
            .unwrap_err();
        assert_eq!(err, Error::NotFound);

        let mut snapshots = local
            .execute(Subscribe(By::<Snapshot, _>::new(bob.user_id)))
            .await
            .expect("subscribed");
        assert_eq!(snapshots.next().await, Some(Ok(vec![])));
    }

    #[tokio::test]
    async fn delivers_fresh_snapshot_on_each_change() {
        let local = test::local();
        let alice = test::sign_in(&local, "a@b.com").await;

        let mut snapshots = local
            .execute(Subscribe(By::<Snapshot, _>::new(alice.user_id)))
            .await
            .expect("subscribed");
        assert_eq!(snapshots.next().await, Some(Ok(vec![])));
        assert_eq!(local.service().feed().subscribers(), 1);

        let id = local
            .execute(Insert(new_entry(alice.user_id, "so happy")))
            .await
            .expect("created");
        let snapshot = snapshots
            .next()
            .await
            .expect("delivered")
            .expect("fetched");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);
        assert_eq!(snapshot[0].mood, Some(entry::Mood::Happy));
        assert_eq!(snapshot[0].progress, 0);

        let updated = local
            .execute(Update(Patch {
                id,
                title: entry::Title::new("meh").expect("valid title"),
                mood: entry::Mood::NotWell,
            }))
            .await
            .expect("updated");
        assert_eq!(updated.mood, Some(entry::Mood::NotWell));
        let snapshot = snapshots
            .next()
            .await
            .expect("delivered")
            .expect("fetched");
        assert_eq!(snapshot[0].title.to_string(), "meh");
        assert_eq!(snapshot[0].created_at, updated.created_at);

        _ = local
            .execute(Delete(By::<Entry, _>::new(id)))
            .await
            .expect("deleted");
        assert_eq!(snapshots.next().await, Some(Ok(vec![])));
        assert_eq!(snapshots.next().now_or_never(), None);

        drop(snapshots);
        assert_eq!(local.service().feed().subscribers(), 0);
    }

    #[tokio::test]
    async fn stops_delivering_once_session_is_switched() {
        let local = test::local();
        let alice = test::sign_in(&local, "a@b.com").await;

        let mut snapshots = local
            .execute(Subscribe(By::<Snapshot, _>::new(alice.user_id)))
            .await
            .expect("subscribed");
        assert_eq!(snapshots.next().await, Some(Ok(vec![])));

        local.execute(SignOut).await.expect("signed out");
        _ = test::sign_in(&local, "c@d.com").await;
        _ = local
            .service()
            .execute(CreateMoodEntry {
                user_id: alice.user_id,
                title: entry::Title::new("happy").expect("valid title"),
                mood: Some(entry::Mood::Happy),
            })
            .await
            .expect("created");

        assert_eq!(snapshots.next().await, Some(Err(Error::Unauthenticated)));
    }

    #[tokio::test]
    async fn signing_out_notifies_listeners() {
        let local = test::local();
        let session = test::sign_in(&local, "a@b.com").await;

        let mut sessions = local
            .execute(Subscribe(By::<Option<_>, _>::new(())))
            .await
            .unwrap_or_else(|e| match e {});
        assert_eq!(sessions.next().await, Some(Some(session)));

        local.execute(SignOut).await.expect("signed out");
        assert_eq!(sessions.next().await, Some(None));
        assert_eq!(local.session(), None);
    }
}
