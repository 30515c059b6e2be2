// SPDX-FileCopyrightText: 2023 Kerstin Humm <mail@erictapen.name>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::QueryError;
use crate::models::{Health, QueryOutput};
use crate::query::{AnalyticsQuery, Limit, Metric};
use crate::service::QueryService;
use log::{error, info, warn};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::{json, Json, Value};
use rocket::{catch, catchers, get, routes, Build, Config, Rocket, State};

impl<'r> Responder<'r, 'static> for QueryError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.class().is_server_error() {
            error!("{} {}: {}", req.method(), req.uri(), self);
        } else {
            warn!("{} {}: {}", req.method(), req.uri(), self);
        }
        (status, Json(json!({ "error": self.to_string() }))).respond_to(req)
    }
}

/// Diesel is blocking, so keep it off the async workers.
async fn run(service: &QueryService, query: AnalyticsQuery) -> Result<Json<QueryOutput>, QueryError> {
    let service = service.clone();
    rocket::tokio::task::spawn_blocking(move || service.run(query))
        .await
        .map_err(|e| QueryError::Query(format!("query worker failed: {}", e)))?
        .map(Json)
}

#[get("/health")]
fn health(service: &State<QueryService>) -> Json<Health> {
    Json(service.health())
}

#[get("/stats")]
async fn stats(service: &State<QueryService>) -> Result<Json<QueryOutput>, QueryError> {
    run(service, AnalyticsQuery::OverallStats).await
}

#[get("/top-trains?<n>&<metric>")]
async fn top_trains(
    service: &State<QueryService>,
    n: Option<&str>,
    metric: Option<&str>,
) -> Result<Json<QueryOutput>, QueryError> {
    let query = AnalyticsQuery::TopTrains {
        limit: Limit::parse(n)?,
        metric: Metric::parse(metric)?,
    };
    run(service, query).await
}

#[get("/destinations?<n>")]
async fn destinations(
    service: &State<QueryService>,
    n: Option<&str>,
) -> Result<Json<QueryOutput>, QueryError> {
    let query = AnalyticsQuery::Destinations {
        limit: Limit::parse(n)?,
    };
    run(service, query).await
}

#[get("/dayparts")]
async fn dayparts(service: &State<QueryService>) -> Result<Json<QueryOutput>, QueryError> {
    run(service, AnalyticsQuery::Dayparts).await
}

#[catch(404)]
fn not_found(req: &Request) -> Json<Value> {
    Json(json!({ "error": format!("not found: {}", req.uri().path()) }))
}

#[catch(default)]
fn fallback(status: Status, _req: &Request) -> Json<Value> {
    Json(json!({ "error": status.reason().unwrap_or("unknown error") }))
}

pub fn build_rocket(service: QueryService, config: Config) -> Rocket<Build> {
    rocket::custom(config)
        .manage(service)
        .mount(
            "/",
            routes![health, stats, top_trains, destinations, dayparts],
        )
        .register("/", catchers![not_found, fallback])
}

pub fn webserver(
    service: QueryService,
    listen: std::net::IpAddr,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let rt = rocket::tokio::runtime::Runtime::new()?;

    let config = Config {
        port,
        address: listen,
        ..Config::debug_default()
    };
    info!(
        "Serving delay statistics from {} on {}:{}",
        service.store().identifier(),
        listen,
        port
    );
    let builder = build_rocket(service, config);
    let _rocket = rt.block_on(builder.launch())?;
    Ok(())
}
