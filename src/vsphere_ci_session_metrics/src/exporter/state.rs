use super::engine::CorrelationEngine;
use std::sync::Arc;

#[derive(Clone)]
pub(super) struct ExporterState {
    engine: Arc<CorrelationEngine>,
}

impl ExporterState {
    pub fn new(engine: Arc<CorrelationEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> Arc<CorrelationEngine> {
        Arc::clone(&self.engine)
    }
}
