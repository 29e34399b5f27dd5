//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretString};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Password};
use crate::{
    domain::{user, User},
    infra::{database, database::constraint, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
///
/// Doesn't create any [`Session`] for the created [`User`].
///
/// [`Session`]: user::Session
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// Raw [`Email`] of a new [`User`].
    pub email: String,

    /// Raw [`Password`] of a new [`User`].
    pub password: SecretString,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser { email, password } = cmd;

        let email = user::Email::new(email)
            .ok_or(E::InvalidEmail)
            .map_err(tracerr::wrap!())?;
        let password = user::Password::new(password.expose_secret())
            .ok_or(E::WeakPassword)
            .map_err(tracerr::wrap!())?;

        let u = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let user = User {
            id: user::Id::new(),
            email,
            password_hash: user::PasswordHash::new(&password),
            created_at: DateTime::now().coerce(),
        };

        let inserted = self.database().execute(Insert(user.clone())).await;
        // Concurrent sign-up with the same email may win the race.
        if inserted.as_ref().is_err_and(|e| {
            e.as_ref().is_unique_violation(constraint::USERS_EMAIL_KEY)
        }) {
            return Err(tracerr::new!(E::EmailOccupied(user.email)));
        }
        inserted
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(user.id = %user.id, "user signed up");

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Email`] is already occupied.
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),

    /// Provided email is not a valid [`Email`].
    #[display("Invalid `Email` format")]
    InvalidEmail,

    /// Provided password is not a valid [`Password`].
    #[display("`Password` is too weak")]
    WeakPassword,
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};
    use tracing_test::traced_test;

    use crate::{
        domain::{user, User},
        in_memory,
        infra::Database as _,
        Command as _,
    };

    use super::{CreateUser, ExecutionError};

    fn cmd(email: &str, password: &str) -> CreateUser {
        CreateUser {
            email: email.into(),
            password: password.to_owned().into(),
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn stores_hashed_password() {
        let svc = in_memory();

        let user = svc.execute(cmd("a@b.com", "secret1")).await.unwrap();

        let email = user::Email::new("a@b.com").unwrap();
        let stored = svc
            .database()
            .execute(Select(By::<Option<User>, _>::new(&email)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, user.id);
        assert_ne!(stored.password_hash.to_string(), "secret1");
        assert!(stored
            .password_hash
            .verify(&user::Password::new("secret1").unwrap()));
        assert!(logs_contain("user signed up"));
    }

    #[tokio::test]
    async fn rejects_invalid_input() {
        let svc = in_memory();

        let err = svc.execute(cmd("nope", "secret1")).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::InvalidEmail));

        let err = svc.execute(cmd("a@b.com", "12345")).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::WeakPassword));
    }

    #[tokio::test]
    async fn rejects_occupied_email_ignoring_case() {
        let svc = in_memory();
        drop(svc.execute(cmd("a@b.com", "secret1")).await.unwrap());

        let err = svc.execute(cmd("A@B.com", "secret2")).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmailOccupied(_)));
    }
}
