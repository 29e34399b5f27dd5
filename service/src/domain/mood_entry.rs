//! [`MoodEntry`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// Single logged mood of a [`User`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MoodEntry {
    /// ID of this [`MoodEntry`].
    pub id: Id,

    /// ID of the [`User`] owning this [`MoodEntry`].
    pub user_id: user::Id,

    /// [`Title`] of this [`MoodEntry`].
    pub title: Title,

    /// [`Mood`] of this [`MoodEntry`], if any was chosen.
    pub mood: Option<Mood>,

    /// Progress of this [`MoodEntry`].
    ///
    /// Always `0` on creation and never changed afterwards.
    pub progress: i32,

    /// [`DateTime`] when this [`MoodEntry`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`MoodEntry`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Free-text title of a [`MoodEntry`].
///
/// May be empty, but no longer than [`Title::MAX_LENGTH`] characters.
#[derive(AsRef, Clone, Debug, Default, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Title(String);

impl Title {
    /// Maximal number of characters in a [`Title`].
    pub const MAX_LENGTH: usize = 512;

    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        title.as_ref().chars().count() <= Self::MAX_LENGTH
    }

    /// Indicates whether this [`Title`] has no visible characters.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

define_kind! {
    #[doc = "Mood of a [`MoodEntry`]."]
    enum Mood {
        #[doc = "Feeling happy."]
        Happy = 1,

        #[doc = "Feeling sad."]
        Sad = 2,

        #[doc = "Feeling unwell."]
        NotWell = 3,
    }
}

impl Mood {
    /// Guesses a [`Mood`] from the provided free `text`.
    ///
    /// Matches case-insensitive keywords only, so [`None`] is returned for
    /// any text not mentioning a known [`Mood`].
    #[must_use]
    pub fn guess(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| text.contains(w));

        if mentions(&["not_well", "not well", "unwell", "sick"]) {
            Some(Self::NotWell)
        } else if mentions(&["sad"]) {
            Some(Self::Sad)
        } else if mentions(&["happy"]) {
            Some(Self::Happy)
        } else {
            None
        }
    }
}

/// [`DateTime`] when a [`MoodEntry`] was created.
pub type CreationDateTime = DateTimeOf<(MoodEntry, unit::Creation)>;
