// Adapters layer: concrete implementations for external systems (datasets, storage, solver).

pub mod solver;
pub mod source;
pub mod storage;
