// SPDX-FileCopyrightText: 2023 Kerstin Humm <mail@erictapen.name>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Throwaway SQLite databases for tests.

use crate::schema::train_delays;
use crate::store::Store;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use diesel::sqlite::SqliteConnection;
use tempfile::TempDir;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = train_delays)]
pub struct NewDelay {
    pub train_no: String,
    pub date_only: String,
    pub delay_min: i64,
    pub last_stop: String,
    pub first_dep: Option<i64>,
}

pub fn row(
    train_no: &str,
    date_only: &str,
    delay_min: i64,
    last_stop: &str,
    first_dep: Option<i64>,
) -> NewDelay {
    NewDelay {
        train_no: train_no.to_string(),
        date_only: date_only.to_string(),
        delay_min,
        last_stop: last_stop.to_string(),
        first_dep,
    }
}

/// A database file living as long as the fixture does.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new(rows: &[NewDelay]) -> Self {
        let fixture = Self::blank();
        let mut conn = fixture.writable();
        conn.batch_execute(
            "CREATE TABLE train_delays (
                train_no TEXT NOT NULL,
                date_only TEXT NOT NULL,
                delay_min INTEGER NOT NULL,
                last_stop TEXT NOT NULL,
                first_dep INTEGER
            )",
        )
        .unwrap();
        for row in rows {
            diesel::insert_into(train_delays::table)
                .values(row)
                .execute(&mut conn)
                .unwrap();
        }
        fixture
    }

    /// Same as [Fixture::new], but the table predates the `first_dep` column.
    pub fn without_first_dep(rows: &[NewDelay]) -> Self {
        let fixture = Self::blank();
        let mut conn = fixture.writable();
        conn.batch_execute(
            "CREATE TABLE train_delays (
                train_no TEXT NOT NULL,
                date_only TEXT NOT NULL,
                delay_min INTEGER NOT NULL,
                last_stop TEXT NOT NULL
            )",
        )
        .unwrap();
        for row in rows {
            diesel::sql_query(
                "INSERT INTO train_delays (train_no, date_only, delay_min, last_stop) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind::<Text, _>(&row.train_no)
            .bind::<Text, _>(&row.date_only)
            .bind::<BigInt, _>(row.delay_min)
            .bind::<Text, _>(&row.last_stop)
            .execute(&mut conn)
            .unwrap();
        }
        fixture
    }

    /// An existing database file without any tables in it.
    pub fn blank() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture { dir };
        // Force SQLite to actually write the file.
        fixture
            .writable()
            .batch_execute("PRAGMA user_version = 1")
            .unwrap();
        fixture
    }

    pub fn store(&self) -> Store {
        Store::new(self.dir.path().join("train_analysis.db"))
    }

    fn writable(&self) -> SqliteConnection {
        let path = self.dir.path().join("train_analysis.db");
        SqliteConnection::establish(path.to_str().unwrap()).unwrap()
    }
}
