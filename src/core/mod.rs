pub mod aggregator;
pub mod etl;
pub mod lp_builder;
pub mod pipeline;

pub use crate::domain::model::{Datasets, RunOutcome, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Solver, Storage};
pub use crate::utils::error::Result;
