//! Navigation contract between the flows and the screen stack.

use std::{cell::RefCell, rc::Rc, sync::Arc};

use crate::backend::entry;

/// Named screen of the application.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Route {
    /// Landing screen with the greeting, the first one past the [`Gate`].
    ///
    /// [`Gate`]: crate::Gate
    Home,

    /// Sign-in form.
    SignIn,

    /// Sign-up form.
    SignUp,

    /// Live list of the mood entries.
    Entries,

    /// Form creating a new mood entry.
    CreateEntry,

    /// Form editing the mood entry with the provided ID.
    EditEntry(entry::Id),
}

impl Route {
    /// Indicates whether this [`Route`] is reachable only past the session
    /// [`Gate`].
    ///
    /// [`Gate`]: crate::Gate
    #[must_use]
    pub const fn is_protected(self) -> bool {
        !matches!(self, Self::SignIn | Self::SignUp)
    }
}

/// Navigation request of a flow.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Navigation {
    /// Opens the [`Route`] on top of the current one.
    Push(Route),

    /// Replaces the current [`Route`] with the provided one.
    Replace(Route),

    /// Returns to the previous [`Route`].
    Back,
}

/// Performer of [`Navigation`] requests.
pub trait Navigator {
    /// Performs the provided [`Navigation`].
    fn navigate(&self, to: Navigation);
}

impl<N: Navigator + ?Sized> Navigator for &N {
    fn navigate(&self, to: Navigation) {
        (**self).navigate(to);
    }
}

impl<N: Navigator + ?Sized> Navigator for Rc<N> {
    fn navigate(&self, to: Navigation) {
        (**self).navigate(to);
    }
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn navigate(&self, to: Navigation) {
        (**self).navigate(to);
    }
}

/// Stack of the opened [`Route`]s.
///
/// Never becomes empty: its root [`Route`] can only be replaced.
#[derive(Debug)]
pub struct Stack(RefCell<Vec<Route>>);

impl Stack {
    /// Creates a new [`Stack`] with the provided `root` [`Route`].
    #[must_use]
    pub fn new(root: Route) -> Self {
        Self(RefCell::new(vec![root]))
    }

    /// Returns the currently shown [`Route`].
    #[must_use]
    pub fn current(&self) -> Route {
        self.0.borrow().last().copied().unwrap_or(Route::Home)
    }

    /// Returns all the opened [`Route`]s, from the root to the current one.
    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        self.0.borrow().clone()
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

impl Navigator for Stack {
    fn navigate(&self, to: Navigation) {
        let mut routes = self.0.borrow_mut();
        match to {
            Navigation::Push(route) => routes.push(route),
            Navigation::Replace(route) => {
                if let Some(current) = routes.last_mut() {
                    *current = route;
                } else {
                    routes.push(route);
                }
            }
            Navigation::Back => {
                if routes.len() > 1 {
                    drop(routes.pop());
                }
            }
        }
        tracing::debug!(to = ?to, "navigated");
    }
}

#[cfg(test)]
mod spec {
    use crate::backend::entry;

    use super::{Navigation, Navigator as _, Route, Stack};

    #[test]
    fn only_credential_routes_are_public() {
        assert!(!Route::SignIn.is_protected());
        assert!(!Route::SignUp.is_protected());
        assert!(Route::Home.is_protected());
        assert!(Route::Entries.is_protected());
        assert!(Route::CreateEntry.is_protected());
        assert!(Route::EditEntry(entry::Id::new()).is_protected());
    }

    #[test]
    fn stack_keeps_its_root() {
        let stack = Stack::default();

        stack.navigate(Navigation::Push(Route::Entries));
        stack.navigate(Navigation::Push(Route::CreateEntry));
        assert_eq!(
            stack.routes(),
            [Route::Home, Route::Entries, Route::CreateEntry],
        );

        stack.navigate(Navigation::Replace(Route::SignIn));
        assert_eq!(stack.routes(), [Route::Home, Route::Entries, Route::SignIn]);

        stack.navigate(Navigation::Back);
        stack.navigate(Navigation::Back);
        stack.navigate(Navigation::Back);
        assert_eq!(stack.routes(), [Route::Home]);
        assert_eq!(stack.current(), Route::Home);
    }
}
