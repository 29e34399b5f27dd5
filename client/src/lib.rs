//! Headless client flows of the Moodify mood tracker.
//!
//! Every flow is written against the [`backend`] contracts and a
//! [`Navigator`], so it may be driven by any UI toolkit and backed either by
//! a remote API or by the in-process [`Local`] backend.

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod auth;
pub mod backend;
pub mod entries;
pub mod form;
pub mod gate;
pub mod home;
pub mod local;
pub mod navigation;
pub mod session;

pub use self::{
    backend::Backend,
    form::{Notice, Submission},
    gate::Gate,
    local::Local,
    navigation::{Navigation, Navigator, Route, Stack},
    session::Session,
};

#[cfg(test)]
pub(crate) mod test {
    //! Helpers shared by the flow tests.

    use std::time::Duration;

    use crate::{
        auth::{SignInForm, SignUpForm},
        Local, Session, Stack,
    };

    /// Creates a new [`Local`] backend over an empty in-memory database.
    pub(crate) fn local() -> Local<service::infra::Memory> {
        Local::in_memory(service::Config::with_secret(
            b"test",
            Duration::from_secs(60),
        ))
    }

    /// Signs up and signs in the `User` with the provided `email` through
    /// the credential flows.
    pub(crate) async fn sign_in(
        local: &Local<service::infra::Memory>,
        email: &str,
    ) -> Session {
        let stack = Stack::default();

        let up = SignUpForm::new(local, &stack);
        up.set_email(email);
        up.set_password("secret1");
        up.set_confirmation("secret1");
        _ = up.submit().await;

        let sign_in = SignInForm::new(local, &stack);
        sign_in.set_email(email);
        sign_in.set_password("secret1");
        _ = sign_in.submit().await;

        local.session().expect("signed in")
    }
}
