//! [`Context`]-related definitions.

use std::sync::atomic::{AtomicU16, Ordering};

use axum::{async_trait, extract::FromRequestParts};
use axum_extra::headers::{
    authorization::Bearer, Authorization, HeaderMapExt as _,
};
use common::DateTime;
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::{
    command::{self, Command as _},
    domain::user::session,
};
use tokio::sync::OnceCell;

#[cfg(doc)]
use crate::api::User;
use crate::{api, define_error, AsError, Error, JuniperResponse, Service};

/// Per-request context of the GraphQL API.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] resolving the request.
    service: Service,

    /// Headers and extensions of the HTTP request.
    parts: http::request::Parts,

    /// Outcome of the [`Session`] authentication, resolved at most once.
    session: OnceCell<Result<Session, Error>>,

    /// [`http::StatusCode`] of the response, if it turns out to be failed.
    error_status: AtomicU16,
}

impl Context {
    /// Creates a new [`Context`] of the HTTP request with the provided
    /// `parts`.
    #[must_use]
    pub fn new(service: Service, parts: http::request::Parts) -> Self {
        Self {
            service,
            parts,
            session: OnceCell::new(),
            error_status: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
        }
    }

    /// Returns the [`Service`] resolving the request.
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the [`http::StatusCode`] to respond with in case of failure.
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(self.error_status.load(Ordering::Relaxed))
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Remembers the [`http::StatusCode`] of the provided [`Error`] and passes
    /// it through.
    ///
    /// Meant for [`Result::map_err()`].
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.error_status
                .store(err.status_code.as_u16(), Ordering::Relaxed);
            err
        }
    }

    /// Treats the request as authenticated with the provided [`Session`],
    /// unless it has been authenticated already.
    pub fn set_current_session(&self, session: Session) {
        _ = self.session.set(Ok(session));
    }

    /// Authenticates the request, returning its [`Session`].
    ///
    /// # Errors
    ///
    /// With `AUTHORIZATION_REQUIRED` if the request carries no token, or the
    /// token is expired or unknown.
    pub async fn current_session(&self) -> Result<Session, Error> {
        self.session
            .get_or_init(|| self.authenticate())
            .await
            .clone()
    }

    /// Takes the `authToken` variable sent by a client on GraphQL
    /// subscription initialization as the bearer token of the request.
    ///
    /// # Errors
    ///
    /// With `INVALID_VARIABLES` if the `authToken` is not a valid token.
    pub(crate) fn authorize_subscription(
        &mut self,
        vars: &juniper::Variables,
    ) -> Result<(), Error> {
        let Some(token) = vars.get("authToken") else {
            return Ok(());
        };
        let header = token
            .as_string_value()
            .and_then(|t| format!("Bearer {t}").parse().ok())
            .ok_or_else(|| Error::from(AuthError::InvalidVariables))?;
        drop(self.parts.headers.insert(http::header::AUTHORIZATION, header));
        Ok(())
    }

    /// Resolves the [`Session`] of the bearer token of the request.
    async fn authenticate(&self) -> Result<Session, Error> {
        let bearer = self
            .parts
            .headers
            .typed_try_get::<Authorization<Bearer>>()
            .map_err(|_| Error::from(AuthError::MalformedAuthorization))
            .and_then(|h| {
                h.ok_or_else(|| AuthError::AuthorizationRequired.into())
            })
            .map_err(self.error())?;
        let token = bearer
            .token()
            .parse::<session::Token>()
            .unwrap_or_else(|e| match e {});

        let session = self
            .service
            .execute(command::AuthorizeUserSession {
                token: token.clone(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(self.error())?;
        tracing::debug!(user.id = %session.user_id, "request authenticated");

        Ok(Session {
            user_id: session.user_id.into(),
            token,
            expires_at: session.expires_at.coerce(),
        })
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let Some(service) = parts.extensions.get::<Service>().cloned() else {
            let err = Error::internal(&"`Service` is not provided");
            return Err(JuniperResponse {
                status_code: err.status_code,
                response: GraphQLBatchResponse::Single(GraphQLResponse::error(
                    err.into_field_error(),
                )),
            });
        };
        Ok(Self::new(service, parts.clone()))
    }
}

/// Authenticated session of a [`User`].
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of the authenticated [`User`].
    pub user_id: api::user::Id,

    /// Token the [`User`] is authenticated with.
    pub token: session::Token,

    /// [`DateTime`] after which this [`Session`] is no longer valid.
    pub expires_at: DateTime,
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Expired
            | Self::JsonWebTokenDecodeError(_)
            | Self::UserNotExists(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "MALFORMED_AUTHORIZATION"]
        #[status = BAD_REQUEST]
        #[message = "`Authorization` header is not a bearer token"]
        MalformedAuthorization,

        #[code = "INVALID_VARIABLES"]
        #[status = BAD_REQUEST]
        #[message = "Invalid subscription authorization variables"]
        InvalidVariables,
    }
}

#[cfg(test)]
mod spec {
    use service::{command::authorize_user_session::ExecutionError, domain};

    use crate::{test, AsError as _};

    #[test]
    fn expired_session_requires_authorization() {
        for e in [
            ExecutionError::Expired,
            ExecutionError::UserNotExists(domain::user::Id::new()),
        ] {
            let err = e.as_error();

            assert_eq!(err.code, "AUTHORIZATION_REQUIRED");
            assert_eq!(err.status_code, http::StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn authenticates_bearer_token() {
        let service = test::service();
        let (user_id, token) = test::sign_in(&service, "a@b.com").await;

        let ctx = test::context(&service, Some(&format!("Bearer {token}")));
        let session = ctx.current_session().await.expect("authenticated");

        assert_eq!(session.user_id, user_id);
        assert_eq!(session.token, token);
    }

    #[tokio::test]
    async fn rejects_missing_and_malformed_tokens() {
        let service = test::service();

        for (header, code, status) in [
            (
                None,
                "AUTHORIZATION_REQUIRED",
                http::StatusCode::UNAUTHORIZED,
            ),
            (
                Some("Bearer not-a-jwt"),
                "AUTHORIZATION_REQUIRED",
                http::StatusCode::UNAUTHORIZED,
            ),
            (
                Some("Basic YTpi"),
                "MALFORMED_AUTHORIZATION",
                http::StatusCode::BAD_REQUEST,
            ),
        ] {
            let ctx = test::context(&service, header);

            let err = ctx.current_session().await.expect_err("unauthorized");

            assert_eq!(err.code, code, "{header:?}");
            assert_eq!(ctx.error_status_code(), status, "{header:?}");
        }
    }

    #[tokio::test]
    async fn takes_token_from_subscription_variables() {
        let service = test::service();
        let (user_id, token) = test::sign_in(&service, "a@b.com").await;
        let mut ctx = test::context(&service, None);

        let mut vars = juniper::Variables::new();
        drop(vars.insert(
            "authToken".to_owned(),
            juniper::InputValue::scalar(token.to_string()),
        ));
        ctx.authorize_subscription(&vars).expect("valid variables");

        let session = ctx.current_session().await.expect("authenticated");
        assert_eq!(session.user_id, user_id);
    }
}
