//! [`Command`] for authorizing a [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::{errors::ErrorKind, Validation};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`] by a [`Session`] token.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let mut validation = Validation::default();
        validation.leeway = 0;
        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config.jwt_decoding_key,
            &validation,
        )
        .map_err(|e| {
            if matches!(e.kind(), ErrorKind::ExpiredSignature) {
                E::Expired
            } else {
                E::JsonWebTokenDecodeError(e)
            }
        })
        .map_err(tracerr::wrap!())?
        .claims;

        drop(
            self.database()
                .execute(Select(By::new(session.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::UserNotExists(session.user_id))
                .map_err(tracerr::wrap!())?,
        );

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Session`] has expired.
    #[display("`Session` has expired")]
    Expired,

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::{
        domain::user::{self, session, Session},
        in_memory, Command as _,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    fn sign(session: &Session) -> session::Token {
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            session,
            &jsonwebtoken::EncodingKey::from_secret(b"test"),
        )
        .unwrap();
        #[expect(unsafe_code, reason = "test")]
        unsafe {
            session::Token::new_unchecked(token)
        }
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let token = "garbage".parse().unwrap();

        let err = in_memory()
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_expired() {
        let token = sign(&Session {
            user_id: user::Id::new(),
            expires_at: DateTime::from_unix_timestamp(1_000)
                .unwrap()
                .coerce(),
        });

        let err = in_memory()
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Expired));
    }

    #[tokio::test]
    async fn rejects_unknown_user() {
        let user_id = user::Id::new();
        let token = sign(&Session {
            user_id,
            expires_at: (DateTime::now() + std::time::Duration::from_secs(60))
                .coerce(),
        });

        let err = in_memory()
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == user_id,
        ));
    }
}
