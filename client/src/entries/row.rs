//! Display representation of an [`Entry`].

use derive_more::Display;
use time::UtcOffset;

use crate::{
    backend::{entry, Entry},
    Navigation, Route,
};

/// Emoji displayed for an [`Entry`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub struct Emoji(&'static str);

impl Emoji {
    /// [`Emoji`] of an [`Entry`] without any mood hints.
    pub const UNKNOWN: Self = Self("❓");

    /// Picks the [`Emoji`] of the provided [`Entry`].
    ///
    /// The stored mood is the source of truth. Title keywords are used only
    /// for the entries without a stored mood.
    #[must_use]
    pub fn of(entry: &Entry) -> Self {
        entry
            .mood
            .map_or_else(|| Self::of_text(entry.title.as_ref()), Self::of_mood)
    }

    /// Returns the [`Emoji`] of the provided [`entry::Mood`].
    #[must_use]
    pub const fn of_mood(mood: entry::Mood) -> Self {
        match mood {
            entry::Mood::Happy => Self("🙂"),
            entry::Mood::Sad => Self("😢"),
            entry::Mood::NotWell => Self("🤒"),
        }
    }

    /// Guesses the [`Emoji`] from the keywords of the provided free `text`.
    #[must_use]
    pub fn of_text(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::UNKNOWN;
        }

        let text = text.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| text.contains(w));
        Self(if mentions(&["sad"]) {
            "😢"
        } else if mentions(&["angry"]) {
            "😡"
        } else if mentions(&["tired"]) {
            "🥱"
        } else if mentions(&["ok", "neutral"]) {
            "😐"
        } else if mentions(&["happy"]) {
            "🙂"
        } else if mentions(&["excited", "great"]) {
            "😍"
        } else {
            "🙂"
        })
    }

    /// Returns this [`Emoji`] as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

/// Row of the [`Entry`] list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Row {
    /// ID of the displayed [`Entry`].
    pub id: entry::Id,

    /// Title of the displayed [`Entry`], or [`Row::UNTITLED`].
    pub title: String,

    /// [`Emoji`] of the displayed [`Entry`].
    pub emoji: Emoji,

    /// Creation time of the displayed [`Entry`] as `YYYY-MM-DD HH:MM` in the
    /// viewer's local time.
    pub created_at: String,
}

impl Row {
    /// Title displayed for an [`Entry`] with a blank title.
    pub const UNTITLED: &'static str = "Untitled Mood";

    /// Creates a new [`Row`] displaying the provided [`Entry`] to a viewer
    /// at the provided [`UtcOffset`].
    #[must_use]
    pub fn new(entry: &Entry, offset: UtcOffset) -> Self {
        Self {
            id: entry.id,
            title: if entry.title.is_blank() {
                Self::UNTITLED.to_owned()
            } else {
                entry.title.to_string()
            },
            emoji: Emoji::of(entry),
            created_at: entry.created_at.to_short_string_at(offset),
        }
    }

    /// Returns the [`Navigation`] opening the editor of the displayed
    /// [`Entry`].
    #[must_use]
    pub const fn edit_link(&self) -> Navigation {
        Navigation::Push(Route::EditEntry(self.id))
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use service::domain::user;
    use time::UtcOffset;

    use crate::{
        backend::{entry, Entry},
        Navigation, Route,
    };

    use super::{Emoji, Row};

    fn sample(title: &str, mood: Option<entry::Mood>) -> Entry {
        Entry {
            id: entry::Id::new(),
            user_id: user::Id::new(),
            title: entry::Title::new(title).expect("valid title"),
            mood,
            progress: 0,
            created_at: DateTime::from_rfc3339("2024-03-05T07:09:11Z")
                .expect("valid datetime")
                .coerce(),
        }
    }

    #[test]
    fn guesses_emoji_from_keywords() {
        assert_eq!(Emoji::of_text("").as_str(), "❓");
        assert_eq!(Emoji::of_text("  ").as_str(), "❓");
        assert_eq!(Emoji::of_text("So SAD").as_str(), "😢");
        assert_eq!(Emoji::of_text("angry bird").as_str(), "😡");
        assert_eq!(Emoji::of_text("tired").as_str(), "🥱");
        assert_eq!(Emoji::of_text("neutral").as_str(), "😐");
        assert_eq!(Emoji::of_text("😊 Happy").as_str(), "🙂");
        assert_eq!(Emoji::of_text("great day").as_str(), "😍");
        assert_eq!(Emoji::of_text("happy and excited").as_str(), "🙂");
        assert_eq!(Emoji::of_text("whatever").as_str(), "🙂");
    }

    #[test]
    fn stored_mood_wins_over_keywords() {
        let e = sample("so happy", Some(entry::Mood::Sad));

        assert_eq!(Emoji::of(&e), Emoji::of_mood(entry::Mood::Sad));
        assert_eq!(Emoji::of(&sample("", None)), Emoji::UNKNOWN);
        assert_eq!(
            Emoji::of(&sample("happy and excited", None)).as_str(),
            "🙂",
        );
    }

    #[test]
    fn renders_row() {
        let e = sample("", Some(entry::Mood::NotWell));
        let row = Row::new(&e, UtcOffset::UTC);

        assert_eq!(row.title, "Untitled Mood");
        assert_eq!(row.emoji.as_str(), "🤒");
        assert_eq!(row.created_at, "2024-03-05 07:09");
        assert_eq!(row.edit_link(), Navigation::Push(Route::EditEntry(e.id)));
    }

    #[test]
    fn shows_creation_time_in_local_time() {
        let e = sample("ok", None);
        let offset = UtcOffset::from_hms(9, 30, 0).expect("valid offset");

        assert_eq!(Row::new(&e, offset).created_at, "2024-03-05 16:39");
    }
}
