pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod model;
pub mod pipeline;
pub mod process;
pub mod reconcile;
pub mod table;

pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, RunReport};
pub use table::{Table, Value};
