// SPDX-FileCopyrightText: 2023 Kerstin Humm <mail@erictapen.name>
//
// SPDX-License-Identifier: GPL-3.0-or-later

// The table is populated by an external ingestion process, we only ever read from it.

diesel::table! {
    train_delays (train_no, date_only) {
        train_no -> Text,
        date_only -> Text,
        delay_min -> BigInt,
        last_stop -> Text,
        first_dep -> Nullable<BigInt>,
    }
}
