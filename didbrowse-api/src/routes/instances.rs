//! Configured-instances endpoint.
//!
//! `GET /instances` lists the namespaces a client may pass to `/did`, plus
//! the one it should preselect when configured.

use axum::{extract::State, routing::get, Json, Router};
use didbrowse_core::Namespace;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSummary {
    pub name: Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstancesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_instance: Option<Namespace>,
    pub instances: Vec<InstanceSummary>,
}

/// GET /instances
pub async fn list_instances(State(state): State<AppState>) -> Json<InstancesResponse> {
    let instances = state
        .clients
        .instance_names()
        .into_iter()
        .map(|name| InstanceSummary { name })
        .collect();

    Json(InstancesResponse {
        active_instance: state.active_instance.clone(),
        instances,
    })
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(list_instances))
}
