//! Landing [`Home`] screen.

use std::cell::Cell;

use common::DateTime;
use derive_more::Display;
use rand::{seq::SliceRandom as _, Rng};
use time::UtcOffset;

use crate::{Navigation, Navigator, Route};

/// Motivational quotes, one of which is shown on the [`Home`] screen.
pub const QUOTES: [&str; 6] = [
    "Take a deep breath — you're doing better than you think. 🌱",
    "Small steps every day lead to big changes. 🚶‍♂️",
    "Your feelings are valid. 💚",
    "Be kind to yourself today. 🌸",
    "Happiness is found in little moments. ✨",
    "Resting is also progress. 😴",
];

/// Daily reminders, one of which is shown on the [`Home`] screen.
pub const REMINDERS: [&str; 4] = [
    "Don’t forget to drink water 💧",
    "Stretch for a minute ⏱️",
    "Smile, even at yourself in the mirror 🙂",
    "Check in with your breathing 🌬️",
];

/// Greeting depending on the time of the day.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Greeting {
    /// Before noon.
    #[display("Good morning 🌞")]
    Morning,

    /// From noon till 6 PM.
    #[display("Good afternoon 🌻")]
    Afternoon,

    /// From 6 PM till midnight.
    #[display("Good evening 🌙")]
    Evening,
}

impl Greeting {
    /// Picks the [`Greeting`] for the provided hour of the day (`0..=23`).
    #[must_use]
    pub const fn at(hour: u8) -> Self {
        match hour {
            0..12 => Self::Morning,
            12..18 => Self::Afternoon,
            _ => Self::Evening,
        }
    }
}

/// Mood picked on the [`Home`] screen just to reflect on it.
///
/// Never stored anywhere.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuickMood {
    /// Feeling happy.
    Happy,

    /// Feeling sad.
    Sad,

    /// Feeling angry.
    Angry,

    /// Feeling tired.
    Tired,
}

impl QuickMood {
    /// All the [`QuickMood`]s, in their display order.
    pub const ALL: [Self; 4] =
        [Self::Happy, Self::Sad, Self::Angry, Self::Tired];

    /// Returns the emoji of this [`QuickMood`].
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Happy => "😊",
            Self::Sad => "😔",
            Self::Angry => "😡",
            Self::Tired => "😴",
        }
    }

    /// Returns the label of this [`QuickMood`].
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Sad => "Sad",
            Self::Angry => "Angry",
            Self::Tired => "Tired",
        }
    }
}

/// Landing screen greeting the user.
#[derive(Debug)]
pub struct Home<N> {
    /// [`Navigator`] to leave this screen with.
    navigator: N,

    /// [`Greeting`] of the moment the screen was opened.
    greeting: Greeting,

    /// Shown quote.
    quote: &'static str,

    /// Shown reminder.
    reminder: &'static str,

    /// Picked [`QuickMood`], if any.
    picked: Cell<Option<QuickMood>>,
}

impl<N> Home<N> {
    /// Opens a new [`Home`] screen at the provided local time.
    #[must_use]
    pub fn new<R: Rng + ?Sized>(
        navigator: N,
        now: DateTime,
        offset: UtcOffset,
        rng: &mut R,
    ) -> Self {
        Self {
            navigator,
            greeting: Greeting::at(now.hour_at(offset)),
            quote: QUOTES.choose(rng).copied().unwrap_or_default(),
            reminder: REMINDERS.choose(rng).copied().unwrap_or_default(),
            picked: Cell::new(None),
        }
    }

    /// Returns the shown [`Greeting`].
    #[must_use]
    pub fn greeting(&self) -> Greeting {
        self.greeting
    }

    /// Returns the shown quote.
    #[must_use]
    pub fn quote(&self) -> &'static str {
        self.quote
    }

    /// Returns the shown reminder.
    #[must_use]
    pub fn reminder(&self) -> &'static str {
        self.reminder
    }

    /// Picks the provided [`QuickMood`].
    pub fn pick(&self, mood: QuickMood) {
        self.picked.set(Some(mood));
    }

    /// Returns the picked [`QuickMood`], if any.
    #[must_use]
    pub fn picked(&self) -> Option<QuickMood> {
        self.picked.get()
    }

    /// Returns the caption of the picked [`QuickMood`], if any.
    #[must_use]
    pub fn caption(&self) -> Option<String> {
        self.picked.get().map(|m| {
            format!("Today you feel: {} {}", m.emoji(), m.label())
        })
    }
}

impl<N: Navigator> Home<N> {
    /// Opens the list of the logged moods.
    pub fn go_to_entries(&self) {
        self.navigator.navigate(Navigation::Push(Route::Entries));
    }

    /// Opens the form logging a new mood.
    pub fn go_to_create(&self) {
        self.navigator.navigate(Navigation::Push(Route::CreateEntry));
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use rand::{rngs::StdRng, SeedableRng as _};
    use time::UtcOffset;

    use crate::{Route, Stack};

    use super::{Greeting, Home, QuickMood, QUOTES, REMINDERS};

    #[test]
    fn greets_by_hour() {
        for (hour, greeting) in [
            (0, Greeting::Morning),
            (11, Greeting::Morning),
            (12, Greeting::Afternoon),
            (17, Greeting::Afternoon),
            (18, Greeting::Evening),
            (23, Greeting::Evening),
        ] {
            assert_eq!(Greeting::at(hour), greeting, "hour {hour}");
        }
        assert_eq!(Greeting::Evening.to_string(), "Good evening 🌙");
    }

    #[test]
    fn greets_in_local_time() {
        let now = DateTime::from_rfc3339("2024-01-01T10:00:00Z")
            .expect("valid datetime");
        let offset = UtcOffset::from_hms(9, 0, 0).expect("valid offset");
        let stack = Stack::default();

        let home =
            Home::new(&stack, now, offset, &mut StdRng::seed_from_u64(1));

        assert_eq!(home.greeting(), Greeting::Evening);
    }

    #[test]
    fn shows_quote_and_reminder() {
        let stack = Stack::default();
        let open = || {
            let mut rng = StdRng::seed_from_u64(7);
            Home::new(&stack, DateTime::now(), UtcOffset::UTC, &mut rng)
        };

        let (a, b) = (open(), open());

        assert!(QUOTES.contains(&a.quote()));
        assert!(REMINDERS.contains(&a.reminder()));
        assert_eq!((a.quote(), a.reminder()), (b.quote(), b.reminder()));
    }

    #[test]
    fn captions_picked_mood() {
        let stack = Stack::default();
        let home = Home::new(
            &stack,
            DateTime::now(),
            UtcOffset::UTC,
            &mut StdRng::seed_from_u64(0),
        );
        assert_eq!(home.caption(), None);

        home.pick(QuickMood::Tired);

        assert_eq!(home.picked(), Some(QuickMood::Tired));
        assert_eq!(home.caption().as_deref(), Some("Today you feel: 😴 Tired"));
        assert_eq!(stack.routes(), [Route::Home]);
    }

    #[test]
    fn links_to_entries() {
        let stack = Stack::default();
        let home = Home::new(
            &stack,
            DateTime::now(),
            UtcOffset::UTC,
            &mut StdRng::seed_from_u64(0),
        );

        home.go_to_entries();
        home.go_to_create();

        assert_eq!(
            stack.routes(),
            [Route::Home, Route::Entries, Route::CreateEntry],
        );
    }
}
