//! Adapters between API Gateway / function URL events and the handlers.

use crate::ingest::save_reading;
use crate::query::{get_readings, QueryParams};
use crate::response::HandlerResponse;
use crate::store::ReadingStore;
use chrono::Utc;
use lambda_http::{Body, Error, Request, RequestExt, Response};

pub async fn handle_save(store: &dyn ReadingStore, event: Request) -> Result<Response<Body>, Error> {
    let body: &[u8] = event.body();
    into_lambda_response(save_reading(store, body, Utc::now()).await)
}

pub async fn handle_query(
    store: &dyn ReadingStore,
    event: Request,
) -> Result<Response<Body>, Error> {
    let params = query_params(&event);
    into_lambda_response(get_readings(store, &params, Utc::now()).await)
}

/// First value of each recognised query string parameter.
pub fn query_params(event: &Request) -> QueryParams {
    let query = event.query_string_parameters();
    QueryParams {
        device_id: query.first("device_id").map(str::to_string),
        range: query.first("range").map(str::to_string),
    }
}

pub fn into_lambda_response(response: HandlerResponse) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(response.status)
        .header("content-type", "application/json")
        .body(Body::from(response.body_string()))?)
}
