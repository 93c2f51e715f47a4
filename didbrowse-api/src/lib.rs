//! didbrowse API - HTTP Layer
//!
//! Serves `GET /did`, which lists the files attached to a dataset identifier
//! on one of the configured remote instances. Answers come from the shared
//! attached-files cache when possible and from the instance's replica
//! service otherwise.

pub mod config;
pub mod error;
pub mod extractors;
pub mod remote;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::{ApiConfig, CacheBackendKind};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use extractors::ApiQuery;
pub use remote::{
    parse_replica_lines, HttpReplicaClientFactory, InstrumentedReplicaSource, ReplicaClientFactory,
    RucioReplicaClient,
};
pub use routes::create_api_router;
pub use state::AppState;
