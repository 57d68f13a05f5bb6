//! Stream pipelines built from chained stages.

pub mod adapter;
pub mod context;
pub mod core;
pub mod stages;

pub use self::adapter::{ErrorLog, source_stage, transform_stage};
pub use self::context::{Output, StageContext};
pub use self::core::{Pipeline, RunReport, Stage, StageItems, StageRole, Stream};
