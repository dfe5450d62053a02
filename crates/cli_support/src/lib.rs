pub mod common;

pub use common::{init_tracing, LogArgs, ModelArgs};
