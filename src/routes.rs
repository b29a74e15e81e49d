use std::convert::Infallible;

use log::error;
use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::domain::DuplicateDatePolicy;
use crate::error::Error;
use crate::storage::Dataset;

pub const API_ROUTES: [&str; 5] = [
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
    "/api/v1.0/<start>",
    "/api/v1.0/<start>/<end>",
];

pub fn home_page() -> String {
    let mut page = String::from("Available Routes:<br/>");
    let routes: Vec<String> = API_ROUTES
        .iter()
        .map(|route| route.replace('<', "&lt;").replace('>', "&gt;"))
        .collect();
    page.push_str(&routes.join("<br/>"));
    page
}

/// Failures are answered here rather than rejected, so a failing fixed route
/// never falls through to the `<start>` route.
fn json_or_failure<T: Serialize>(result: Result<T, Error>) -> Response {
    match result {
        Ok(body) => warp::reply::json(&body).into_response(),
        Err(failure) => {
            error!("Request failed: {}", failure);
            warp::reply::with_status("Internal Server Error", StatusCode::INTERNAL_SERVER_ERROR)
                .into_response()
        }
    }
}

async fn serve_precipitation(
    dataset: Dataset,
    policy: DuplicateDatePolicy,
) -> Result<Response, Infallible> {
    Ok(json_or_failure(dataset.precipitation(policy).await))
}

async fn serve_stations(dataset: Dataset) -> Result<Response, Infallible> {
    Ok(json_or_failure(dataset.stations().await))
}

async fn serve_tobs(dataset: Dataset) -> Result<Response, Infallible> {
    Ok(json_or_failure(dataset.tobs().await))
}

async fn serve_stats_since(start: String, dataset: Dataset) -> Result<Response, Infallible> {
    Ok(json_or_failure(dataset.temperature_stats(&start, None).await))
}

async fn serve_stats_between(
    start: String,
    end: String,
    dataset: Dataset,
) -> Result<Response, Infallible> {
    Ok(json_or_failure(dataset.temperature_stats(&start, Some(&end)).await))
}

async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Infallible> {
    let (message, status) = if rejection.is_not_found() {
        ("Not Found", StatusCode::NOT_FOUND)
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        ("Method Not Allowed", StatusCode::METHOD_NOT_ALLOWED)
    } else {
        error!("Unhandled rejection: {:?}", rejection);
        ("Internal Server Error", StatusCode::INTERNAL_SERVER_ERROR)
    };

    Ok(warp::reply::with_status(message, status))
}

fn with_dataset(dataset: Dataset) -> impl Filter<Extract = (Dataset,), Error = Infallible> + Clone {
    warp::any().map(move || dataset.clone())
}

pub fn routes(
    dataset: Dataset,
    policy: DuplicateDatePolicy,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let index_route = warp::path::end().map(|| warp::reply::html(home_page()));
    let precipitation_route = warp::path!("api" / "v1.0" / "precipitation")
        .and(with_dataset(dataset.clone()))
        .and(warp::any().map(move || policy))
        .and_then(serve_precipitation);
    let stations_route = warp::path!("api" / "v1.0" / "stations")
        .and(with_dataset(dataset.clone()))
        .and_then(serve_stations);
    let tobs_route = warp::path!("api" / "v1.0" / "tobs")
        .and(with_dataset(dataset.clone()))
        .and_then(serve_tobs);
    let stats_since_route = warp::path!("api" / "v1.0" / String)
        .and(with_dataset(dataset.clone()))
        .and_then(serve_stats_since);
    let stats_between_route = warp::path!("api" / "v1.0" / String / String)
        .and(with_dataset(dataset))
        .and_then(serve_stats_between);

    warp::get()
        .and(
            index_route
                .or(precipitation_route)
                .or(stations_route)
                .or(tobs_route)
                .or(stats_since_route)
                .or(stats_between_route),
        )
        .recover(handle_rejection)
        .with(warp::log("surfsup"))
}
