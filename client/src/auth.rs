//! Credential flows: sign-in and sign-up forms.

use std::cell::{Cell, RefCell};

use secrecy::{ExposeSecret as _, SecretString};

use crate::{
    backend::{Backend, SignIn, SignInError, SignUp, SignUpError},
    form::InFlight,
    Navigation, Navigator, Route, Session, Submission,
};

/// Sign-in form.
#[derive(Debug)]
pub struct SignInForm<B, N> {
    /// Identity provider to sign in with.
    backend: B,

    /// [`Navigator`] to leave this form with.
    navigator: N,

    /// Entered email.
    email: RefCell<String>,

    /// Entered password.
    password: RefCell<SecretString>,

    /// Message of the last failed submission.
    error: Cell<Option<&'static str>>,

    /// Outstanding submission flag.
    in_flight: InFlight,
}

impl<B, N> SignInForm<B, N> {
    /// Message shown when some of the fields is empty.
    pub const EMPTY_FIELDS: &'static str = "Please enter email and password.";

    /// Creates a new empty [`SignInForm`].
    #[must_use]
    pub fn new(backend: B, navigator: N) -> Self {
        Self {
            backend,
            navigator,
            email: RefCell::default(),
            password: RefCell::new(SecretString::from(String::new())),
            error: Cell::new(None),
            in_flight: InFlight::default(),
        }
    }

    /// Sets the entered email.
    pub fn set_email(&self, email: impl Into<String>) {
        *self.email.borrow_mut() = email.into();
    }

    /// Returns the entered email.
    #[must_use]
    pub fn email(&self) -> String {
        self.email.borrow().clone()
    }

    /// Sets the entered password.
    pub fn set_password(&self, password: impl Into<String>) {
        *self.password.borrow_mut() = SecretString::from(password.into());
    }

    /// Returns the message of the last failed submission, if any.
    #[must_use]
    pub fn error(&self) -> Option<&'static str> {
        self.error.get()
    }

    /// Indicates whether the submit affordance is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.in_flight.is_set()
    }
}

impl<B, N> SignInForm<B, N>
where
    B: Backend<SignIn, Ok = Session, Err = SignInError>,
    N: Navigator,
{
    /// Submits the entered credentials.
    ///
    /// Empty fields are rejected without calling the identity provider.
    /// Successful sign in leaves to the protected [`Route::Home`], while a
    /// failed one keeps the form filled.
    pub async fn submit(&self) -> Submission {
        let Some(_guard) = self.in_flight.start() else {
            return Submission::Ignored;
        };
        self.error.set(None);

        let email = self.email.borrow().trim().to_owned();
        let password = self.password.borrow().expose_secret().to_owned();
        if email.is_empty() || password.is_empty() {
            self.error.set(Some(Self::EMPTY_FIELDS));
            return Submission::Rejected;
        }

        match self
            .backend
            .execute(SignIn {
                email,
                password: SecretString::from(password),
            })
            .await
        {
            Ok(session) => {
                tracing::info!(user.id = %session.user_id, "signed in");
                self.navigator.navigate(Navigation::Replace(Route::Home));
                Submission::Succeeded
            }
            Err(e) => {
                tracing::warn!("failed to sign in: {e}");
                self.error.set(Some(e.message()));
                Submission::Failed
            }
        }
    }

    /// Opens the [`SignUpForm`].
    pub fn go_to_sign_up(&self) {
        self.navigator.navigate(Navigation::Push(Route::SignUp));
    }
}

/// Sign-up form.
#[derive(Debug)]
pub struct SignUpForm<B, N> {
    /// Identity provider to sign up with.
    backend: B,

    /// [`Navigator`] to leave this form with.
    navigator: N,

    /// Entered email.
    email: RefCell<String>,

    /// Entered password.
    password: RefCell<SecretString>,

    /// Entered password confirmation.
    confirmation: RefCell<SecretString>,

    /// Message of the last failed submission.
    error: Cell<Option<&'static str>>,

    /// Outstanding submission flag.
    in_flight: InFlight,
}

impl<B, N> SignUpForm<B, N> {
    /// Message shown when some of the fields is empty.
    pub const EMPTY_FIELDS: &'static str = "Please fill email and password.";

    /// Message shown when the password and its confirmation differ.
    pub const MISMATCH: &'static str = "Passwords do not match.";

    /// Creates a new empty [`SignUpForm`].
    #[must_use]
    pub fn new(backend: B, navigator: N) -> Self {
        Self {
            backend,
            navigator,
            email: RefCell::default(),
            password: RefCell::new(SecretString::from(String::new())),
            confirmation: RefCell::new(SecretString::from(String::new())),
            error: Cell::new(None),
            in_flight: InFlight::default(),
        }
    }

    /// Sets the entered email.
    pub fn set_email(&self, email: impl Into<String>) {
        *self.email.borrow_mut() = email.into();
    }

    /// Returns the entered email.
    #[must_use]
    pub fn email(&self) -> String {
        self.email.borrow().clone()
    }

    /// Sets the entered password.
    pub fn set_password(&self, password: impl Into<String>) {
        *self.password.borrow_mut() = SecretString::from(password.into());
    }

    /// Sets the entered password confirmation.
    pub fn set_confirmation(&self, confirmation: impl Into<String>) {
        *self.confirmation.borrow_mut() =
            SecretString::from(confirmation.into());
    }

    /// Returns the message of the last failed submission, if any.
    #[must_use]
    pub fn error(&self) -> Option<&'static str> {
        self.error.get()
    }

    /// Indicates whether the submit affordance is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.in_flight.is_set()
    }
}

impl<B, N> SignUpForm<B, N>
where
    B: Backend<SignUp, Ok = (), Err = SignUpError>,
    N: Navigator,
{
    /// Submits the entered credentials.
    ///
    /// Empty fields and a mismatching confirmation are rejected without
    /// calling the identity provider. Successful sign up leaves to
    /// [`Route::SignIn`] without establishing any [`Session`].
    pub async fn submit(&self) -> Submission {
        let Some(_guard) = self.in_flight.start() else {
            return Submission::Ignored;
        };
        self.error.set(None);

        let email = self.email.borrow().trim().to_owned();
        let password = self.password.borrow().expose_secret().to_owned();
        if email.is_empty() || password.is_empty() {
            self.error.set(Some(Self::EMPTY_FIELDS));
            return Submission::Rejected;
        }
        if password != self.confirmation.borrow().expose_secret() {
            self.error.set(Some(Self::MISMATCH));
            return Submission::Rejected;
        }

        match self
            .backend
            .execute(SignUp {
                email,
                password: SecretString::from(password),
            })
            .await
        {
            Ok(()) => {
                tracing::info!("signed up");
                self.navigator.navigate(Navigation::Replace(Route::SignIn));
                Submission::Succeeded
            }
            Err(e) => {
                tracing::warn!("failed to sign up: {e}");
                self.error.set(Some(e.message()));
                Submission::Failed
            }
        }
    }

    /// Returns to the [`SignInForm`].
    pub fn go_to_sign_in(&self) {
        self.navigator.navigate(Navigation::Replace(Route::SignIn));
    }
}

#[cfg(test)]
mod spec {
    use std::cell::Cell;

    use common::Handler;

    use crate::{
        backend::{SignIn, SignInError, SignUp, SignUpError},
        test, Route, Session, Stack, Submission,
    };

    use super::{SignInForm, SignUpForm};

    /// Identity provider failing every call with the provided error, while
    /// counting the calls.
    #[derive(Debug)]
    struct Failing<E> {
        error: Option<E>,
        calls: Cell<usize>,
    }

    impl<E> Default for Failing<E> {
        fn default() -> Self {
            Self {
                error: None,
                calls: Cell::new(0),
            }
        }
    }

    impl<E> Failing<E> {
        fn with(error: E) -> Self {
            Self {
                error: Some(error),
                calls: Cell::new(0),
            }
        }
    }

    impl Handler<SignIn> for Failing<SignInError> {
        type Ok = Session;
        type Err = SignInError;

        async fn execute(&self, _: SignIn) -> Result<Session, SignInError> {
            self.calls.set(self.calls.get() + 1);
            tokio::task::yield_now().await;
            Err(self.error.clone().unwrap_or(SignInError::Network))
        }
    }

    impl Handler<SignUp> for Failing<SignUpError> {
        type Ok = ();
        type Err = SignUpError;

        async fn execute(&self, _: SignUp) -> Result<(), SignUpError> {
            self.calls.set(self.calls.get() + 1);
            tokio::task::yield_now().await;
            Err(self.error.clone().unwrap_or(SignUpError::Network))
        }
    }

    #[tokio::test]
    async fn sign_in_rejects_empty_fields_locally() {
        let stack = Stack::default();
        let backend = Failing::<SignInError>::default();
        let form = SignInForm::new(&backend, &stack);

        for (email, password) in [("", "secret1"), ("   ", "x"), ("a@b.com", "")]
        {
            form.set_email(email);
            form.set_password(password);

            assert_eq!(form.submit().await, Submission::Rejected);
            assert_eq!(form.error(), Some("Please enter email and password."));
        }
        assert_eq!(backend.calls.get(), 0);
        assert_eq!(stack.routes(), [Route::Home]);
    }

    #[tokio::test]
    async fn sign_in_maps_each_category_to_its_message() {
        for (error, message) in [
            (SignInError::InvalidEmail, "Invalid email address."),
            (SignInError::UserNotFound, "No account found with that email."),
            (SignInError::WrongPassword, "Incorrect password."),
            (SignInError::Network, "Network error — check your connection."),
            (
                SignInError::Other("auth/unknown".into()),
                "Failed to sign in. Please check credentials.",
            ),
        ] {
            let stack = Stack::default();
            let backend = Failing::with(error);
            let form = SignInForm::new(&backend, &stack);
            form.set_email(" a@b.com ");
            form.set_password("secret1");

            assert_eq!(form.submit().await, Submission::Failed);
            assert_eq!(form.error(), Some(message));
            assert_eq!(form.email(), " a@b.com ");
            assert_eq!(stack.routes(), [Route::Home]);
        }
    }

    #[tokio::test]
    async fn sign_in_ignores_duplicate_submissions() {
        let stack = Stack::default();
        let backend = Failing::with(SignInError::Network);
        let form = SignInForm::new(&backend, &stack);
        form.set_email("a@b.com");
        form.set_password("secret1");

        let (first, second) = futures::join!(form.submit(), async {
            assert!(!form.can_submit());
            form.submit().await
        });

        assert_eq!(first, Submission::Failed);
        assert_eq!(second, Submission::Ignored);
        assert_eq!(backend.calls.get(), 1);
        assert!(form.can_submit());
    }

    #[tokio::test]
    async fn sign_up_rejects_locally() {
        let stack = Stack::default();
        let backend = Failing::<SignUpError>::default();
        let form = SignUpForm::new(&backend, &stack);

        form.set_email("a@b.com");
        assert_eq!(form.submit().await, Submission::Rejected);
        assert_eq!(form.error(), Some("Please fill email and password."));

        form.set_password("secret1");
        form.set_confirmation("secret2");
        assert_eq!(form.submit().await, Submission::Rejected);
        assert_eq!(form.error(), Some("Passwords do not match."));

        assert_eq!(backend.calls.get(), 0);
    }

    #[tokio::test]
    async fn sign_up_maps_each_category_to_its_message() {
        for (error, message) in [
            (SignUpError::InvalidEmail, "Invalid email address."),
            (
                SignUpError::EmailInUse,
                "An account already exists with that email.",
            ),
            (
                SignUpError::WeakPassword,
                "Password is too weak. Use at least 6 characters.",
            ),
            (SignUpError::Network, "Network error — check your connection."),
            (
                SignUpError::Other("auth/unknown".into()),
                "Failed to sign up. Please try again.",
            ),
        ] {
            let stack = Stack::default();
            let backend = Failing::with(error);
            let form = SignUpForm::new(&backend, &stack);
            form.set_email("a@b.com");
            form.set_password("secret1");
            form.set_confirmation("secret1");

            assert_eq!(form.submit().await, Submission::Failed);
            assert_eq!(form.error(), Some(message));
            assert_eq!(form.email(), "a@b.com");
        }
    }

    #[tokio::test]
    async fn signs_up_then_in_with_same_credentials() {
        let local = test::local();
        let stack = Stack::new(Route::SignIn);

        let sign_in = SignInForm::new(&local, &stack);
        sign_in.go_to_sign_up();
        assert_eq!(stack.current(), Route::SignUp);

        let sign_up = SignUpForm::new(&local, &stack);
        sign_up.set_email("a@b.com");
        sign_up.set_password("secret1");
        sign_up.set_confirmation("secret1");
        assert_eq!(sign_up.submit().await, Submission::Succeeded);
        assert_eq!(stack.current(), Route::SignIn);
        assert!(local.session().is_none());

        sign_in.set_email("a@b.com");
        sign_in.set_password("secret1");
        assert_eq!(sign_in.submit().await, Submission::Succeeded);
        assert_eq!(stack.current(), Route::Home);
        assert!(stack.current().is_protected());
        assert!(local.session().is_some());
    }

    #[tokio::test]
    async fn local_provider_categorizes_failures() {
        let local = test::local();
        let stack = Stack::default();

        let sign_up = SignUpForm::new(&local, &stack);
        sign_up.set_email("a@b.com");
        sign_up.set_password("12345");
        sign_up.set_confirmation("12345");
        assert_eq!(sign_up.submit().await, Submission::Failed);
        assert_eq!(sign_up.error(), Some(SignUpError::WeakPassword.message()));

        sign_up.set_email("not-an-email");
        sign_up.set_password("secret1");
        sign_up.set_confirmation("secret1");
        assert_eq!(sign_up.submit().await, Submission::Failed);
        assert_eq!(sign_up.error(), Some(SignUpError::InvalidEmail.message()));

        _ = test::sign_in(&local, "a@b.com").await;
        sign_up.set_email("A@B.com");
        assert_eq!(sign_up.submit().await, Submission::Failed);
        assert_eq!(sign_up.error(), Some(SignUpError::EmailInUse.message()));

        let sign_in = SignInForm::new(&local, &stack);
        sign_in.set_email("c@d.com");
        sign_in.set_password("secret1");
        assert_eq!(sign_in.submit().await, Submission::Failed);
        assert_eq!(sign_in.error(), Some(SignInError::UserNotFound.message()));

        sign_in.set_email("a@b.com");
        sign_in.set_password("secret2");
        assert_eq!(sign_in.submit().await, Submission::Failed);
        assert_eq!(sign_in.error(), Some(SignInError::WrongPassword.message()));
    }
}
