use crate::constants::METRICS_NAMESPACE;
use prometheus::{Gauge, GaugeVec, IntCounter, Opts, Registry};

const CORRELATED_LABELS: [&str; 6] = [
    "username",
    "user_agent",
    "ci_job",
    "build_id",
    "pull_request",
    "vcenter",
];

fn opts(name: &str, help: &str) -> Opts {
    Opts::new(name, help).namespace(METRICS_NAMESPACE)
}

/// Metrics describing the exporter itself. These outlive a single scrape.
pub struct ExporterMetrics {
    pub scrapes_total: IntCounter,
    pub vcenter_up: Gauge,
    pub prow_up: Gauge,
}

impl ExporterMetrics {
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            scrapes_total: IntCounter::with_opts(opts(
                "exporter_scrapes_total",
                "Current total scrapes",
            ))?,
            vcenter_up: Gauge::with_opts(opts("vcenter_up", "Was vCenter up last scrape."))?,
            prow_up: Gauge::with_opts(opts("prow_up", "Was Prow up last scrape."))?,
        })
    }

    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.scrapes_total.clone()))?;
        registry.register(Box::new(self.vcenter_up.clone()))?;
        registry.register(Box::new(self.prow_up.clone()))?;
        Ok(())
    }
}

/// Fresh gauge family for the correlations of one scrape.
pub fn correlated_gauge() -> prometheus::Result<GaugeVec> {
    GaugeVec::new(
        opts("correlated", "Correlated data between Prow and vCenter"),
        &CORRELATED_LABELS,
    )
}
