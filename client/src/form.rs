//! Shared building blocks of the client forms.

use std::cell::Cell;

/// Outcome of a form submission.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Submission {
    /// Submission was ignored without any backend call: either another
    /// submission is still outstanding, or there is nothing to submit.
    Ignored,

    /// Submission was rejected by the local validation without any backend
    /// call.
    Rejected,

    /// Backend failed to perform the submission.
    Failed,

    /// Submission succeeded.
    Succeeded,
}

/// Blocking message the UI must show and let the user dismiss.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notice {
    /// Title of this [`Notice`].
    pub title: &'static str,

    /// Message of this [`Notice`].
    pub message: String,
}

impl Notice {
    /// Creates a new generic error [`Notice`] with the provided `message`.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "Error",
            message: message.into(),
        }
    }
}

/// Flag of an outstanding submission.
#[derive(Debug, Default)]
pub(crate) struct InFlight(Cell<bool>);

impl InFlight {
    /// Indicates whether a submission is outstanding.
    pub(crate) fn is_set(&self) -> bool {
        self.0.get()
    }

    /// Marks a submission as outstanding until the returned [`Guard`] is
    /// dropped.
    ///
    /// Returns [`None`] if another submission is still outstanding.
    pub(crate) fn start(&self) -> Option<Guard<'_>> {
        (!self.0.replace(true)).then_some(Guard(&self.0))
    }
}

/// Guard of an outstanding submission, clearing the [`InFlight`] flag on
/// drop.
#[derive(Debug)]
pub(crate) struct Guard<'f>(&'f Cell<bool>);

impl Drop for Guard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod spec {
    use super::InFlight;

    #[test]
    fn in_flight_allows_single_submission() {
        let flag = InFlight::default();

        let guard = flag.start();
        assert!(guard.is_some());
        assert!(flag.is_set());
        assert!(flag.start().is_none());

        drop(guard);
        assert!(!flag.is_set());
        assert!(flag.start().is_some());
    }
}
