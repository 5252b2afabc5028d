pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{solver::ExternalSolver, source::DatasetLoader, storage::LocalStorage};
pub use core::{
    aggregator::aggregate, etl::EtlEngine, lp_builder::LpModelBuilder,
    pipeline::AllocationPipeline,
};
pub use domain::lp::LpModel;
pub use domain::model::{Aggregation, EntityTotals, ModelSettings, ModelVariant, RunOutcome};
pub use utils::error::{LpError, Result};
