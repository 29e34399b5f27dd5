//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the request is not authenticated;
    /// - `USER_NOT_EXISTS` - if the authenticated `User` was removed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `MoodEntry` with the specified ID, if it's owned by the
    /// current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "moodEntry",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn mood_entry(
        id: api::mood_entry::Id,
        ctx: &Context,
    ) -> Result<Option<api::MoodEntry>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::mood_entry::ById {
                id: id.into(),
                user_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|e| e.map(Into::into))
    }

    /// Returns all the `MoodEntry`s of the current `User`, newest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "moodEntries",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn mood_entries(
        ctx: &Context,
    ) -> Result<Vec<api::MoodEntry>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::mood_entries::ByOwner::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|entries| entries.into_iter().map(Into::into).collect())
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
