//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretString};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Email, Password};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`] by [`User`] credentials.
#[derive(Clone, Debug)]
pub struct CreateUserSession {
    /// Raw [`Email`] of a [`User`].
    pub email: String,

    /// Raw [`Password`] of a [`User`].
    pub password: SecretString,
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: for<'l> Database<
        Select<By<Option<User>, &'l user::Email>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUserSession { email, password } = cmd;

        let email = user::Email::new(email)
            .ok_or(E::InvalidEmail)
            .map_err(tracerr::wrap!())?;

        let user = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::UserNotFound(email))
            .map_err(tracerr::wrap!())?;

        // Password not matching the format can't match any stored hash.
        let matches = user::Password::new(password.expose_secret())
            .is_some_and(|p| user.password_hash.verify(&p));
        if !matches {
            return Err(tracerr::new!(E::WrongPassword));
        }

        let expires_at = DateTime::now() + self.config.session_ttl;
        // `exp` claim has a seconds precision.
        let expires_at =
            DateTime::from_unix_timestamp(expires_at.unix_timestamp())
                .unwrap_or(expires_at)
                .coerce();
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                expires_at,
            },
            &self.config.jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        tracing::debug!(user.id = %user.id, "session created");

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Provided email is not a valid [`Email`].
    #[display("Invalid `Email` format")]
    InvalidEmail,

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided [`Email`] does not exist.
    #[display("`User(email: {_0})` does not exist")]
    #[from(ignore)]
    UserNotFound(#[error(not(source))] user::Email),

    /// Provided [`Password`] doesn't match the [`User`]'s one.
    #[display("Wrong `User` password")]
    WrongPassword,
}
