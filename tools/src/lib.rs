pub mod config;
pub mod report;

pub use config::{ModelOverrides, RunConfig};
pub use report::architecture_report;
