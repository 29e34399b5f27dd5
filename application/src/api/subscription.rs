//! GraphQL [`Subscription`]s definitions.

use common::DateTime;
use futures::{
    stream::{self, BoxStream},
    FutureExt as _, StreamExt as _,
};
use juniper::graphql_subscription;
use service::{query, Query as _};

use crate::{api, context, AsError, Context, Error};

/// Root of all GraphQL subscription.
#[derive(Clone, Copy, Debug)]
pub struct Subscription;

impl Subscription {
    /// Name of the [`tracing::Span`] for the subscriptions.
    const SPAN_NAME: &'static str = "GraphQL subscription";
}

#[graphql_subscription(context = Context)]
impl Subscription {
    /// Subscription to the whole list of the current `User`'s `MoodEntry`s,
    /// newest first.
    ///
    /// Emits the current list right away, and then a fresh one after each
    /// change of the `User`'s `MoodEntry`s, until the session expires.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the current session is not
    ///                              authenticated or session expired.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "moodEntries",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn mood_entries(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<Vec<api::MoodEntry>, Error>>, Error>
    {
        let session = ctx.current_session().await?;
        let owner = session.user_id.into();
        let expired = tokio::time::sleep(session.expires_at - DateTime::now());
        let service = ctx.service().clone();

        let changes = service
            .execute(query::mood_entries::Changes { owner })
            .await
            .map_err(AsError::into_error)?;

        Ok(changes
            .then(move |()| {
                let service = service.clone();
                async move {
                    service
                        .execute(query::mood_entries::ByOwner::by(owner))
                        .await
                        .map(|entries| {
                            entries.into_iter().map(Into::into).collect()
                        })
                        .map_err(AsError::into_error)
                }
            })
            .take_until(expired)
            .chain(stream::once(async {
                Err(context::AuthError::AuthorizationRequired.into())
            }))
            .boxed())
    }

    /// Subscription waiting for the current authenticated session to expire.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the current session is not
    ///                              authenticated or session expired.
    pub async fn wait_session(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<bool, Error>>, Error> {
        let session = ctx.current_session().await?;
        let timeout = session.expires_at - DateTime::now();
        Ok(stream::once(
            tokio::time::sleep(timeout).map(|()| {
                Err(context::AuthError::AuthorizationRequired.into())
            }),
        )
        .boxed())
    }
}
