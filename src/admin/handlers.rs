use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::routing::KeyShape;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub routes: usize,
    pub codecs: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteStatus {
    pub pattern: String,
    pub verb: String,
    pub interface: String,
    pub method: String,
    pub key_shape: KeyShape,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CodecStatus {
    pub media_types: Vec<String>,
    pub default: String,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        routes: state.router.table().len(),
        codecs: state.codecs.media_types().len(),
    })
}

pub async fn get_routes(State(state): State<AppState>) -> Json<Vec<RouteStatus>> {
    let routes = state
        .router
        .table()
        .entries()
        .map(|(key, invoker)| RouteStatus {
            pattern: key.pattern.clone(),
            verb: key.verb.to_string(),
            interface: invoker.interface().name().to_string(),
            method: invoker.method().name().to_string(),
            key_shape: invoker.key_shape(),
        })
        .collect();
    Json(routes)
}

pub async fn get_codecs(State(state): State<AppState>) -> Json<CodecStatus> {
    Json(CodecStatus {
        media_types: state
            .codecs
            .media_types()
            .into_iter()
            .map(String::from)
            .collect(),
        default: state.codecs.default_codec().media_type().to_string(),
    })
}
