pub mod addr_info;

use axum::http::Method;
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::aggregator::AddrInfoService;

#[derive(Clone)]
pub struct AppState {
    pub addr_info: Arc<AddrInfoService>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::PUT, Method::GET, Method::POST, Method::DELETE]);

    Router::new()
        .route("/", get(root))
        .route("/api/get/addrInfo/{address}", get(addr_info::get_addr_info))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> &'static str {
    "running locally"
}
