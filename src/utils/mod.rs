pub mod error;
pub mod logger;
pub mod monitor;
pub mod numeric;
pub mod validation;
