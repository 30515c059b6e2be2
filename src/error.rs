// SPDX-FileCopyrightText: 2023 Kerstin Humm <mail@erictapen.name>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::http::Status;
use thiserror::Error;

/// Everything that can go wrong while answering a query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// A request parameter was malformed or outside its closed set of values.
    #[error("{0}")]
    InvalidParameter(String),

    /// The store doesn't look like we expect it to, e.g. a column is missing.
    #[error("schema mismatch: {0}")]
    Schema(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("query failed: {0}")]
    Query(String),
}

impl QueryError {
    pub fn status(&self) -> Status {
        match self {
            QueryError::InvalidParameter(_) => Status::BadRequest,
            QueryError::Schema(_) => Status::InternalServerError,
            QueryError::StoreUnavailable(_) => Status::ServiceUnavailable,
            QueryError::Query(_) => Status::InternalServerError,
        }
    }
}

impl From<DieselError> for QueryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::Unknown, ref info)
                if info.message().starts_with("no such table")
                    || info.message().starts_with("no such column") =>
            {
                QueryError::Schema(info.message().to_string())
            }
            other => QueryError::Query(other.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for QueryError {
    fn from(err: diesel::ConnectionError) -> Self {
        QueryError::StoreUnavailable(err.to_string())
    }
}
