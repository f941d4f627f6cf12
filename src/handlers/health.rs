// GET /health handler

use std::convert::Infallible;

use serde_json::json;

pub async fn health_handler() -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::json(&json!({
        "status": "ok",
        "message": "API service is running",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
