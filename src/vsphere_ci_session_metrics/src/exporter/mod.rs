mod engine;
mod handlers;
mod metrics;
mod routes;
mod server;
mod state;

pub use engine::{CorrelatedObservation, CorrelationEngine, EngineOptions};
pub use handlers::metrics::METRICS_ENDPOINT;
pub use server::{get_router, ExporterServer};
