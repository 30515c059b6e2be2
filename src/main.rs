// SPDX-FileCopyrightText: 2020 Kerstin Humm <mail@erictapen.name>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use docopt::Docopt;
use log::{error, info};
use serde::Deserialize;

pub mod cli_utils;
pub mod error;
pub mod models;
pub mod query;
pub mod schema;
pub mod service;
pub mod store;
pub mod web_api;

#[cfg(test)]
mod fixtures;

use service::QueryService;
use store::Store;

const DEFAULT_DB_PATH: &str = "train_analysis.db";

const USAGE: &str = "
Usage: train-delays-server [--port <port>] [--listen <ip>] [--db <path>]
       train-delays-server check-schema [--db <path>]
       train-delays-server --help

Options:
    -h, --help           Show this message.
    --port <port>        TCP port on which the server listens. [default: 5000]
    -l, --listen <ip>    IP address to listen on, e.g. ::. [default: 127.0.0.1]
    --db <path>          SQLite database holding the train_delays table. Falls back to
                         $DATABASE_URL, then to train_analysis.db.
";

#[derive(Deserialize, Debug)]
struct CliArgs {
    flag_port: u16,
    flag_listen: std::net::IpAddr,
    flag_db: Option<String>,
    cmd_check_schema: bool,
}

/// Where the delay records live, by order of precedence.
fn db_path(flag: Option<String>, env: Option<String>) -> String {
    flag.or(env)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
}

fn main() {
    // Setup logging
    if systemd_journal_logger::connected_to_journal() {
        // If journald is available.
        systemd_journal_logger::JournalLog::new()
            .and_then(|journal| journal.install().map_err(std::io::Error::other))
            .unwrap_or_else(|e| {
                eprintln!("Can't set up journal logging: {}", e);
                std::process::exit(1);
            });
        log::set_max_level(log::LevelFilter::Info);
    } else {
        // Otherwise fall back to logging to standard error.
        simple_logger::SimpleLogger::new()
            .env()
            .init()
            .unwrap_or_else(|e| {
                eprintln!("Can't set up logging: {}", e);
                std::process::exit(1);
            });
    }

    let args: CliArgs = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    let store = Store::new(db_path(args.flag_db, std::env::var("DATABASE_URL").ok()));

    if args.cmd_check_schema {
        cli_utils::check_schema(&store).unwrap_or_else(|e| {
            error!("{}", e);
            std::process::exit(1);
        });
        std::process::exit(0);
    }

    if !store.path().is_file() {
        // Not fatal, the file might show up later. Requests fail with 503 until then.
        info!("{} doesn't exist yet.", store.identifier());
    }

    web_api::webserver(QueryService::new(store), args.flag_listen, args.flag_port).unwrap_or_else(
        |e| {
            error!("{}", e);
            std::process::exit(1);
        },
    );
}
