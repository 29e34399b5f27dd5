//! [`Error`]-related definitions.

use std::{convert::Infallible, fmt};

use derive_more::Error as StdError;
use itertools::Itertools as _;
use juniper::IntoFieldError;
use service::infra::database;
use tracerr::{Trace, Traced};

/// Declares an enum of API errors, each variant having its own code, HTTP
/// status and message, convertible into an [`Error`].
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// API error.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error,
            Eq,
            PartialEq,
        )]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                let (code, status) = match err {
                    $(
                        $name::$variant => {
                            ($code, ::http::StatusCode::$status_code)
                        }
                    )*
                };
                Self::new(code, status, err)
            }
        }
    };
}

/// Error returned by the GraphQL API.
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// Machine-readable code of this [`Error`].
    pub code: Code,

    /// [`http::StatusCode`] of the response failed with this [`Error`].
    pub status_code: http::StatusCode,

    /// Trace of the place this [`Error`] originated at.
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// Human-readable message of this [`Error`].
    pub message: String,
}

impl Error {
    /// Creates a new [`Error`] without a trace.
    #[must_use]
    pub fn new(
        code: Code,
        status_code: http::StatusCode,
        message: impl fmt::Display,
    ) -> Self {
        Self {
            code,
            status_code,
            backtrace: None,
            message: message.to_string(),
        }
    }

    /// Creates a new `INTERNAL_SERVER_ERROR` [`Error`].
    ///
    /// The `msg` is logged, as it's the only hint on what went wrong.
    #[must_use]
    pub fn internal(msg: &impl fmt::Display) -> Self {
        tracing::error!("internal server error: {msg}");
        Self::new(
            "INTERNAL_SERVER_ERROR",
            http::StatusCode::INTERNAL_SERVER_ERROR,
            msg,
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.code, self.message)?;
        if let Some(trace) = &self.backtrace {
            write!(f, "\n{}", trace.iter().format("\n"))?;
        }
        Ok(())
    }
}

impl<S: From<String>> IntoFieldError<S> for Error {
    fn into_field_error(self) -> juniper::FieldError<S> {
        let backtrace = self
            .backtrace
            .iter()
            .flat_map(|trace| trace.iter())
            .map(|frame| juniper::Value::scalar(frame.to_string()))
            .collect();

        let mut ext = juniper::Object::with_capacity(2);
        let code = juniper::Value::scalar(self.code.to_owned());
        drop(ext.add_field("code", code));
        drop(ext.add_field("backtrace", juniper::Value::list(backtrace)));

        juniper::FieldError::new(self.message, juniper::Value::object(ext))
    }
}

/// Code of an [`Error`].
pub type Code = &'static str;

/// Conversion of a failure into an API [`Error`].
pub trait AsError {
    /// Converts this failure into an [`Error`], unless it's an unexpected
    /// one.
    fn try_as_error(&self) -> Option<Error>;

    /// Converts this failure into an [`Error`], treating unexpected ones as
    /// internal.
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Same as [`AsError::as_error()`], but consumes this failure.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        self.as_ref().try_as_error().map(|mut e| {
            e.backtrace = Some(self.trace().clone());
            e
        })
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for Infallible {
    fn try_as_error(&self) -> Option<Error> {
        match *self {}
    }
}
