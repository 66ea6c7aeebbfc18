pub(super) mod metrics;
