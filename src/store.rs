// SPDX-FileCopyrightText: 2023 Kerstin Humm <mail@erictapen.name>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::QueryError;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::path::{Path, PathBuf};

/// Name of the one table we read from, see [crate::schema::train_delays].
pub const TABLE: &str = "train_delays";

/// Location of the delay records database.
///
/// Every call to [Store::connect] opens a new session, nothing is kept around between requests.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    path: PathBuf,
}

#[derive(QueryableByName, Debug)]
struct ColumnInfo {
    #[diesel(sql_type = Text)]
    name: String,
}

impl Store {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Store { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How the store shows up in health responses.
    pub fn identifier(&self) -> String {
        self.path.display().to_string()
    }

    /// Open a fresh read-only session.
    ///
    /// SQLite would happily create an empty database for a path that doesn't exist, so we check
    /// for the file first.
    pub fn connect(&self) -> Result<SqliteConnection, QueryError> {
        if !self.path.is_file() {
            return Err(QueryError::StoreUnavailable(format!(
                "no database file at {}",
                self.path.display()
            )));
        }
        let url = self.path.to_str().ok_or_else(|| {
            QueryError::StoreUnavailable(format!(
                "database path {} is not valid UTF-8",
                self.path.display()
            ))
        })?;

        debug!("Opening {}", url);
        let mut conn = SqliteConnection::establish(url)?;
        conn.batch_execute("PRAGMA query_only = ON")
            .map_err(|e| QueryError::StoreUnavailable(e.to_string()))?;
        Ok(conn)
    }

    /// Column names of the delay table, empty if the table doesn't exist.
    pub fn columns(conn: &mut SqliteConnection) -> Result<Vec<String>, QueryError> {
        let columns = diesel::sql_query(format!("PRAGMA table_info({})", TABLE))
            .load::<ColumnInfo>(conn)?
            .into_iter()
            .map(|c| c.name)
            .collect();
        Ok(columns)
    }
}
