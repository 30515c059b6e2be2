// SPDX-FileCopyrightText: 2023 Kerstin Humm <mail@erictapen.name>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Nullable, Text};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Health {
    pub status: &'static str,
    pub db: String,
}

/// Size and date range of the whole table. Dates are `None` for an empty table.
#[derive(Queryable, Serialize, Debug, Clone, PartialEq)]
pub struct OverallStats {
    pub n_rows: i64,
    pub n_trains: i64,
    pub date_min: Option<String>,
    pub date_max: Option<String>,
}

/// Lateness of a single train over all days it ran.
#[derive(QueryableByName, Serialize, Debug, Clone, PartialEq)]
pub struct TopTrain {
    #[diesel(sql_type = Text)]
    pub train_no: String,
    #[diesel(sql_type = BigInt)]
    pub days_late: i64,
    /// Only averaged over the late days, so `None` for a train that was never late.
    #[diesel(sql_type = Nullable<Double>)]
    pub avg_delay_when_late: Option<f64>,
}

#[derive(QueryableByName, Serialize, Debug, Clone, PartialEq)]
pub struct Destination {
    #[diesel(sql_type = Text)]
    pub last_stop: String,
    #[diesel(sql_type = BigInt)]
    pub delays_count: i64,
    #[diesel(sql_type = BigInt)]
    pub unique_trains: i64,
}

/// Lateness of all journeys starting in one [crate::query::Daypart].
#[derive(QueryableByName, Serialize, Debug, Clone, PartialEq)]
pub struct DaypartRow {
    #[diesel(sql_type = Text)]
    pub doba_dana: String,
    #[diesel(sql_type = BigInt)]
    pub n_rows: i64,
    #[diesel(sql_type = BigInt)]
    pub n_late: i64,
    #[diesel(sql_type = Nullable<Double>)]
    pub avg_delay_when_late: Option<f64>,
}

/// Result of one [crate::query::AnalyticsQuery], serialized as the bare record or row list.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum QueryOutput {
    Stats(OverallStats),
    TopTrains(Vec<TopTrain>),
    Destinations(Vec<Destination>),
    Dayparts(Vec<DaypartRow>),
}

impl QueryOutput {
    pub fn row_count(&self) -> usize {
        match self {
            QueryOutput::Stats(_) => 1,
            QueryOutput::TopTrains(rows) => rows.len(),
            QueryOutput::Destinations(rows) => rows.len(),
            QueryOutput::Dayparts(rows) => rows.len(),
        }
    }
}
