// SPDX-FileCopyrightText: 2023 Kerstin Humm <mail@erictapen.name>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! The closed set of aggregations we answer, and the SQL behind them.
//!
//! Nothing in here takes SQL from the outside. Request parameters are parsed into [Limit] and
//! [Metric] first, and those only ever map onto static fragments or bound values.

use crate::error::QueryError;
use crate::store::TABLE;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_LIMIT: i64 = 15;

const MINUTES_PER_DAY: i64 = 1440;

/// One of the four fixed query shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsQuery {
    OverallStats,
    TopTrains { limit: Limit, metric: Metric },
    Destinations { limit: Limit },
    Dayparts,
}

impl AnalyticsQuery {
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsQuery::OverallStats => "stats",
            AnalyticsQuery::TopTrains { .. } => "top-trains",
            AnalyticsQuery::Destinations { .. } => "destinations",
            AnalyticsQuery::Dayparts => "dayparts",
        }
    }
}

/// Maximum number of rows to return. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(i64);

impl Limit {
    pub fn new(n: i64) -> Result<Self, QueryError> {
        if n < 1 {
            return Err(QueryError::InvalidParameter(format!(
                "n must be a positive integer, got {}",
                n
            )));
        }
        Ok(Limit(n))
    }

    /// Parse the raw `n` query parameter, falling back to [DEFAULT_LIMIT] when it is absent.
    pub fn parse(raw: Option<&str>) -> Result<Self, QueryError> {
        match raw {
            None => Ok(Limit(DEFAULT_LIMIT)),
            Some(s) => {
                let n = s.trim().parse::<i64>().map_err(|_| {
                    QueryError::InvalidParameter(format!(
                        "n must be a positive integer, got '{}'",
                        s
                    ))
                })?;
                Limit::new(n)
            }
        }
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl Default for Limit {
    fn default() -> Self {
        Limit(DEFAULT_LIMIT)
    }
}

/// Ranking criterion for the top trains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// How often a train was late.
    #[default]
    Days,
    /// How late a train was on average, when it was late.
    Avg,
}

impl Metric {
    pub fn parse(raw: Option<&str>) -> Result<Self, QueryError> {
        raw.map_or(Ok(Metric::default()), str::parse)
    }

    pub fn order_clause(&self) -> &'static str {
        match self {
            Metric::Days => "days_late DESC, avg_delay_when_late DESC, train_no ASC",
            Metric::Avg => "avg_delay_when_late DESC, days_late DESC, train_no ASC",
        }
    }
}

impl FromStr for Metric {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "days" => Ok(Metric::Days),
            "avg" => Ok(Metric::Avg),
            _ => Err(QueryError::InvalidParameter(
                "metric must be 'days' or 'avg'".to_string(),
            )),
        }
    }
}

/// Six hour window of the day in which a journey starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Daypart {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl Daypart {
    /// In the order they are reported.
    pub const ALL: [Daypart; 4] = [
        Daypart::Night,
        Daypart::Morning,
        Daypart::Afternoon,
        Daypart::Evening,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Daypart::Night => "Night",
            Daypart::Morning => "Morning",
            Daypart::Afternoon => "Afternoon",
            Daypart::Evening => "Evening",
        }
    }

    /// First minute after midnight belonging to this daypart.
    pub fn start(&self) -> i64 {
        match self {
            Daypart::Night => 0,
            Daypart::Morning => 360,
            Daypart::Afternoon => 720,
            Daypart::Evening => 1080,
        }
    }

    /// First minute after midnight no longer belonging to this daypart.
    pub fn end(&self) -> i64 {
        self.start() + MINUTES_PER_DAY / 4
    }

    /// Which daypart a departure `first_dep` minutes after midnight falls into. Values outside of
    /// a single day wrap around, in both directions.
    pub fn classify(first_dep: i64) -> Daypart {
        let minute = first_dep.rem_euclid(MINUTES_PER_DAY);
        Daypart::ALL
            .into_iter()
            .find(|d| minute < d.end())
            .unwrap_or(Daypart::Evening)
    }
}

impl fmt::Display for Daypart {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `first_dep` reduced to `[0, 1440)`. SQLite's `%` keeps the sign of the dividend.
fn minute_of_day_sql() -> String {
    format!(
        "((first_dep % {day}) + {day}) % {day}",
        day = MINUTES_PER_DAY
    )
}

pub fn top_trains_sql(metric: Metric) -> String {
    format!(
        "SELECT
            CAST(train_no AS TEXT) AS train_no,
            SUM(CASE WHEN delay_min > 0 THEN 1 ELSE 0 END) AS days_late,
            AVG(CASE WHEN delay_min > 0 THEN delay_min END) AS avg_delay_when_late
        FROM {table}
        GROUP BY train_no
        ORDER BY {order}
        LIMIT ?",
        table = TABLE,
        order = metric.order_clause()
    )
}

pub fn destinations_sql() -> String {
    format!(
        "SELECT
            CAST(last_stop AS TEXT) AS last_stop,
            SUM(CASE WHEN delay_min > 0 THEN 1 ELSE 0 END) AS delays_count,
            COUNT(DISTINCT train_no) AS unique_trains
        FROM {table}
        GROUP BY last_stop
        ORDER BY delays_count DESC, last_stop ASC
        LIMIT ?",
        table = TABLE
    )
}

/// Rows without a `first_dep` don't match any of the `WHEN` branches and end up in the last
/// daypart.
pub fn dayparts_sql() -> String {
    let minute = minute_of_day_sql();
    let last = Daypart::Evening;

    let buckets: String = Daypart::ALL
        .iter()
        .filter(|d| **d != last)
        .map(|d| format!("WHEN {} < {} THEN '{}' ", minute, d.end(), d.label()))
        .collect();
    let ordering: String = Daypart::ALL
        .iter()
        .enumerate()
        .map(|(i, d)| format!("WHEN '{}' THEN {} ", d.label(), i))
        .collect();

    format!(
        "SELECT
            CASE {buckets}ELSE '{last}' END AS doba_dana,
            COUNT(*) AS n_rows,
            SUM(CASE WHEN delay_min > 0 THEN 1 ELSE 0 END) AS n_late,
            AVG(CASE WHEN delay_min > 0 THEN delay_min END) AS avg_delay_when_late
        FROM {table}
        GROUP BY doba_dana
        ORDER BY CASE doba_dana {ordering}END",
        buckets = buckets,
        last = last.label(),
        table = TABLE,
        ordering = ordering
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_to_fifteen() {
        assert_eq!(Limit::parse(None).unwrap().get(), 15);
        assert_eq!(Limit::parse(Some("3")).unwrap().get(), 3);
        assert_eq!(Limit::parse(Some("100000")).unwrap().get(), 100000);
    }

    #[test]
    fn limit_rejects_garbage_instead_of_defaulting() {
        for raw in ["abc", "", "1.5", "0", "-4"] {
            assert!(
                matches!(Limit::parse(Some(raw)), Err(QueryError::InvalidParameter(_))),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn metric_is_a_closed_set() {
        assert_eq!(Metric::parse(None).unwrap(), Metric::Days);
        assert_eq!(Metric::parse(Some("days")).unwrap(), Metric::Days);
        assert_eq!(Metric::parse(Some("avg")).unwrap(), Metric::Avg);
        assert_eq!(
            Metric::parse(Some("bogus")),
            Err(QueryError::InvalidParameter(
                "metric must be 'days' or 'avg'".into()
            ))
        );
        assert!(Metric::parse(Some("days; DROP TABLE train_delays")).is_err());
    }

    #[test]
    fn metric_picks_primary_sort_key() {
        assert!(Metric::Days.order_clause().starts_with("days_late DESC"));
        assert!(Metric::Avg
            .order_clause()
            .starts_with("avg_delay_when_late DESC, days_late DESC"));
        assert!(top_trains_sql(Metric::Avg).contains(Metric::Avg.order_clause()));
    }

    #[test]
    fn daypart_boundaries_are_closed_open() {
        assert_eq!(Daypart::classify(0), Daypart::Night);
        assert_eq!(Daypart::classify(359), Daypart::Night);
        assert_eq!(Daypart::classify(360), Daypart::Morning);
        assert_eq!(Daypart::classify(719), Daypart::Morning);
        assert_eq!(Daypart::classify(720), Daypart::Afternoon);
        assert_eq!(Daypart::classify(1080), Daypart::Evening);
        assert_eq!(Daypart::classify(1439), Daypart::Evening);
    }

    #[test]
    fn daypart_wraps_around_midnight() {
        assert_eq!(Daypart::classify(1440), Daypart::Night);
        assert_eq!(Daypart::classify(1500), Daypart::Night);
        assert_eq!(Daypart::classify(1440 + 400), Daypart::Morning);
        // 23:30 of the previous day
        assert_eq!(Daypart::classify(-30), Daypart::Evening);
    }

    #[test]
    fn dayparts_sql_is_built_from_the_same_boundaries() {
        let sql = dayparts_sql();
        assert!(sql.contains("< 360 THEN 'Night'"));
        assert!(sql.contains("< 1080 THEN 'Afternoon'"));
        assert!(sql.contains("ELSE 'Evening' END AS doba_dana"));
        assert!(sql.contains("WHEN 'Evening' THEN 3"));
    }

    #[test]
    fn queries_have_names() {
        let q = AnalyticsQuery::TopTrains {
            limit: Limit::default(),
            metric: Metric::Avg,
        };
        assert_eq!(q.name(), "top-trains");
        assert_eq!(AnalyticsQuery::Dayparts.name(), "dayparts");
    }
}
