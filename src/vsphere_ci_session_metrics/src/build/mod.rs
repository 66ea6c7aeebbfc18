mod namespace;
mod resolver;

pub use namespace::{namespace_from_logs, scan_for_namespace};
pub use resolver::BuildUserResolver;
