//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Converts a [`Row`] selected from `users` table into a [`User`].
fn from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Postgres {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, email, password_hash, created_at \
            FROM users \
            WHERE id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Email>>> for Postgres {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();

        const SQL: &str = "\
            SELECT id, email, password_hash, created_at \
            FROM users \
            WHERE LOWER(email) = LOWER($1::VARCHAR) \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&email])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl Database<Insert<User>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            email,
            password_hash,
            created_at,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (id, email, password_hash, created_at) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, \
                $4::TIMESTAMPTZ\
            )";
        self.exec(SQL, &[&id, &email, &password_hash, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
