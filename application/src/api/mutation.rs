//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use secrecy::SecretString;
use service::{command, Command as _};

use crate::{
    api::{self, CredentialsError, MoodEntryError},
    AsError, Context, Error, Session,
};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Registers a new `User` with the provided credentials.
    ///
    /// Doesn't authenticate the created `User`, so `signIn` should be called
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_EMAIL` - provided email is not a valid email address;
    /// - `WEAK_PASSWORD` - provided password is too short or too long;
    /// - `EMAIL_OCCUPIED` - provided email is occupied by another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "signUp",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn sign_up(
        email: String,
        password: String,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(command::CreateUser {
                email,
                password: SecretString::from(password),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Session` for the `User` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_EMAIL` - provided email is not a valid email address;
    /// - `USER_NOT_FOUND` - no `User` is registered with the provided email;
    /// - `WRONG_PASSWORD` - provided password doesn't match the `User`'s one.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "signIn",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn sign_in(
        email: String,
        password: String,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession {
                email,
                password: SecretString::from(password),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        });

        Ok(output.into())
    }

    /// Logs a new `MoodEntry` of the current `User`.
    ///
    /// Missing `title` is stored as an empty one.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createMoodEntry",
            mood = ?mood,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_mood_entry(
        title: Option<api::mood_entry::Title>,
        mood: Option<api::mood_entry::Mood>,
        ctx: &Context,
    ) -> Result<api::MoodEntry, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateMoodEntry {
                user_id: my_id.into(),
                title: title.map(Into::into).unwrap_or_default(),
                mood: mood.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Replaces the title and the mood of the current `User`'s `MoodEntry`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the request is not authenticated;
    /// - `MOOD_ENTRY_NOT_EXISTS` - if the current `User` has no `MoodEntry`
    ///                             with the specified ID.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateMoodEntry",
            id = %id,
            mood = ?mood,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_mood_entry(
        id: api::mood_entry::Id,
        title: Option<api::mood_entry::Title>,
        mood: api::mood_entry::Mood,
        ctx: &Context,
    ) -> Result<api::MoodEntry, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateMoodEntry {
                id: id.into(),
                user_id: my_id.into(),
                title: title.map(Into::into).unwrap_or_default(),
                mood: mood.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the current `User`'s `MoodEntry`, returning its ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the request is not authenticated;
    /// - `MOOD_ENTRY_NOT_EXISTS` - if the current `User` has no `MoodEntry`
    ///                             with the specified ID.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteMoodEntry",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_mood_entry(
        id: api::mood_entry::Id,
        ctx: &Context,
    ) -> Result<api::mood_entry::Id, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteMoodEntry {
                id: id.into(),
                user_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|e| e.id.into())
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => {
                Some(CredentialsError::EmailOccupied.into())
            }
            Self::InvalidEmail => Some(CredentialsError::InvalidEmail.into()),
            Self::WeakPassword => Some(CredentialsError::WeakPassword.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidEmail => Some(CredentialsError::InvalidEmail.into()),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotFound(_) => {
                Some(CredentialsError::UserNotFound.into())
            }
            Self::WrongPassword => Some(CredentialsError::WrongPassword.into()),
        }
    }
}

impl AsError for command::create_mood_entry::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_mood_entry::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::MoodEntryNotExists(_) => {
                Some(MoodEntryError::NotExists.into())
            }
        }
    }
}

impl AsError for command::delete_mood_entry::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::MoodEntryNotExists(_) => {
                Some(MoodEntryError::NotExists.into())
            }
        }
    }
}
