use crate::ingest::save_reading;
use crate::metrics;
use crate::query::{get_readings, QueryParams};
use crate::response::HandlerResponse;
use crate::store::SharedStore;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;

#[derive(Clone)]
struct AppState {
    store: SharedStore,
}

pub fn create_router(store: SharedStore) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/readings", get(list_readings).post(create_reading))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn create_reading(State(state): State<AppState>, body: Bytes) -> HandlerResponse {
    save_reading(state.store.as_ref(), &body, Utc::now()).await
}

async fn list_readings(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> HandlerResponse {
    let params = QueryParams::from_pairs(pairs);
    get_readings(state.store.as_ref(), &params, Utc::now()).await
}

async fn metrics_handler() -> String {
    metrics::gather_metrics()
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body)).into_response()
    }
}
