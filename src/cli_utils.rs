// SPDX-FileCopyrightText: 2023 2023 Kerstin Humm <mail@erictapen.name>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::schema::train_delays;
use crate::store::{Store, TABLE};
use diesel::Column;
use log::{error, info, warn};
use std::fmt;

/// Columns every query needs.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    train_delays::train_no::NAME,
    train_delays::date_only::NAME,
    train_delays::delay_min::NAME,
    train_delays::last_stop::NAME,
];

/// Only needed for the dayparts.
pub const OPTIONAL_COLUMNS: [&str; 1] = [train_delays::first_dep::NAME];

#[derive(Debug, PartialEq)]
pub struct MissingColumns(pub Vec<String>);

impl std::error::Error for MissingColumns {}

impl fmt::Display for MissingColumns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} is missing columns: {}", TABLE, self.0.join(", "))
    }
}

/// Check that the store has everything the query service expects.
///
/// A missing `first_dep` is only a warning, as everything except `/dayparts` keeps working.
pub fn check_schema(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    info!("Checking schema of {}...", store.identifier());
    let mut conn = store.connect()?;
    let columns = Store::columns(&mut conn)?;

    if columns.is_empty() {
        error!("There is no {} table.", TABLE);
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !columns.iter().any(|have| have == *c))
        .map(|c| c.to_string())
        .collect();
    for c in &missing {
        error!("Column {}.{} is missing.", TABLE, c);
    }

    for c in OPTIONAL_COLUMNS
        .iter()
        .filter(|c| !columns.iter().any(|have| have == *c))
    {
        warn!("Column {}.{} is missing, /dayparts will fail.", TABLE, c);
    }

    if missing.is_empty() {
        info!("Schema looks good.");
        Ok(())
    } else {
        Err(Box::new(MissingColumns(missing)))
    }
}
