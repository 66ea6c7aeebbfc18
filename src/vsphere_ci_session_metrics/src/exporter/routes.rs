use super::handlers::metrics::{metrics, METRICS_ENDPOINT};
use super::state::ExporterState;
use axum::routing::{get, MethodRouter};
use std::sync::LazyLock;

pub(super) static ROUTES: LazyLock<Vec<(&'static str, MethodRouter<ExporterState>)>> =
    LazyLock::new(|| vec![(METRICS_ENDPOINT, get(metrics))]);
