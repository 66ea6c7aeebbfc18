pub mod build;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod exporter;
pub mod kube;
pub mod logging;
pub mod prow;
pub mod utils;
pub mod vsphere;

#[cfg(test)]
mod test_utils;
