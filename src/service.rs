// SPDX-FileCopyrightText: 2023 Kerstin Humm <mail@erictapen.name>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::QueryError;
use crate::models::*;
use crate::query::{dayparts_sql, destinations_sql, top_trains_sql, AnalyticsQuery};
use crate::store::{Store, TABLE};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel::sqlite::SqliteConnection;
use log::debug;

/// Answers [AnalyticsQuery]s against a [Store].
///
/// Holds nothing but the store location, so it can be cloned into every request.
#[derive(Debug, Clone)]
pub struct QueryService {
    store: Store,
}

impl QueryService {
    pub fn new(store: Store) -> Self {
        QueryService { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Doesn't touch the store at all.
    pub fn health(&self) -> Health {
        Health {
            status: "ok",
            db: self.store.identifier(),
        }
    }

    /// Run a single aggregation on its own connection, which is closed again before returning.
    pub fn run(&self, query: AnalyticsQuery) -> Result<QueryOutput, QueryError> {
        debug!("Running {:?}", query);
        let mut conn = self.store.connect()?;

        let output = match query {
            AnalyticsQuery::OverallStats => QueryOutput::Stats(overall_stats(&mut conn)?),
            AnalyticsQuery::TopTrains { limit, metric } => QueryOutput::TopTrains(
                diesel::sql_query(top_trains_sql(metric))
                    .bind::<BigInt, _>(limit.get())
                    .load::<TopTrain>(&mut conn)?,
            ),
            AnalyticsQuery::Destinations { limit } => QueryOutput::Destinations(
                diesel::sql_query(destinations_sql())
                    .bind::<BigInt, _>(limit.get())
                    .load::<Destination>(&mut conn)?,
            ),
            AnalyticsQuery::Dayparts => {
                if !Store::columns(&mut conn)?.iter().any(|c| c == "first_dep") {
                    return Err(QueryError::Schema(format!(
                        "{} has no first_dep column, dayparts can't be computed",
                        TABLE
                    )));
                }
                QueryOutput::Dayparts(
                    diesel::sql_query(dayparts_sql()).load::<DaypartRow>(&mut conn)?,
                )
            }
        };

        debug!("{} returned {} rows", query.name(), output.row_count());
        Ok(output)
    }
}

fn overall_stats(conn: &mut SqliteConnection) -> Result<OverallStats, QueryError> {
    use crate::schema::train_delays::dsl::*;
    use diesel::dsl::{count_distinct, count_star, max, min};

    let stats = train_delays
        .select((
            count_star(),
            count_distinct(train_no),
            min(date_only),
            max(date_only),
        ))
        .get_result::<OverallStats>(conn)?;
    Ok(stats)
}
