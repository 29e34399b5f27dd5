//! [`MoodEntry`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, api::scalar, Context};

/// A logged mood of a `User`.
#[derive(Clone, Debug, From)]
pub struct MoodEntry(domain::MoodEntry);

/// A logged mood of a `User`.
#[graphql_object(context = Context)]
impl MoodEntry {
    /// Unique identifier of this `MoodEntry`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "MoodEntry.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `User` owning this `MoodEntry`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "MoodEntry.owner",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn owner(&self) -> api::User {
        api::User::by_id(self.0.user_id)
    }

    /// Free-text title of this `MoodEntry`, possibly empty.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "MoodEntry.title",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn title(&self) -> Title {
        self.0.title.clone().into()
    }

    /// `Mood` of this `MoodEntry`, if chosen.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "MoodEntry.mood",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn mood(&self) -> Option<Mood> {
        self.0.mood.map(Into::into)
    }

    /// Progress of this `MoodEntry`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "MoodEntry.progress",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn progress(&self) -> i32 {
        self.0.progress
    }

    /// `DateTime` when this `MoodEntry` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "MoodEntry.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `MoodEntry`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::mood_entry::Id)]
#[into(domain::mood_entry::Id)]
#[graphql(name = "MoodEntryId", transparent)]
pub struct Id(Uuid);

/// Title of a `MoodEntry`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "MoodEntryTitle",
    with = scalar::Via::<domain::mood_entry::Title>,
)]
pub struct Title(domain::mood_entry::Title);

/// Mood of a `MoodEntry`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
pub enum Mood {
    /// Feeling happy.
    Happy,

    /// Feeling sad.
    Sad,

    /// Feeling unwell.
    NotWell,
}

impl From<domain::mood_entry::Mood> for Mood {
    fn from(mood: domain::mood_entry::Mood) -> Self {
        use domain::mood_entry::Mood as M;
        match mood {
            M::Happy => Self::Happy,
            M::Sad => Self::Sad,
            M::NotWell => Self::NotWell,
        }
    }
}

impl From<Mood> for domain::mood_entry::Mood {
    fn from(mood: Mood) -> Self {
        match mood {
            Mood::Happy => Self::Happy,
            Mood::Sad => Self::Sad,
            Mood::NotWell => Self::NotWell,
        }
    }
}

#[cfg(test)]
mod spec {
    use service::domain;

    use super::Mood;

    #[test]
    fn mood_converts_both_ways() {
        for &m in domain::mood_entry::Mood::ALL {
            assert_eq!(domain::mood_entry::Mood::from(Mood::from(m)), m);
        }
    }
}
