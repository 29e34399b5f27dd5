//! [`MoodEntry`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{mood_entry, user, MoodEntry},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Converts a [`Row`] selected from `mood_entries` table into a
/// [`MoodEntry`].
fn from_row(row: &Row) -> MoodEntry {
    MoodEntry {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        mood: row.get("mood"),
        progress: row.get("progress"),
        created_at: row.get("created_at"),
    }
}

impl Database<Select<By<Option<MoodEntry>, mood_entry::Id>>> for Postgres {
    type Ok = Option<MoodEntry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<MoodEntry>, mood_entry::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: mood_entry::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, user_id, title, mood, progress, created_at \
            FROM mood_entries \
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

impl Database<Select<By<Vec<MoodEntry>, user::Id>>> for Postgres {
    type Ok = Vec<MoodEntry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<MoodEntry>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, user_id, title, mood, progress, created_at \
            FROM mood_entries \
            WHERE user_id = $1::UUID \
            ORDER BY created_at DESC, id DESC";
        Ok(self
            .query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl Database<Insert<MoodEntry>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<MoodEntry>,
    ) -> Result<Self::Ok, Self::Err> {
        let MoodEntry {
            id,
            user_id,
            title,
            mood,
            progress,
            created_at,
        } = entry;

        const SQL: &str = "\
            INSERT INTO mood_entries (\
                id, user_id, \
                title, mood, \
                progress, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::INT2, \
                $5::INT4, $6::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[&id, &user_id, &title, &mood, &progress, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

/// Overwrites only the mutable fields (title and mood) of a [`MoodEntry`].
impl Database<Update<MoodEntry>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(entry): Update<MoodEntry>,
    ) -> Result<Self::Ok, Self::Err> {
        let MoodEntry {
            id, title, mood, ..
        } = entry;

        const SQL: &str = "\
            UPDATE mood_entries \
            SET title = $2::VARCHAR, \
                mood = $3::INT2 \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id, &title, &mood])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl Database<Delete<By<MoodEntry, mood_entry::Id>>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<MoodEntry, mood_entry::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: mood_entry::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM mood_entries \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
