// Domain layer: core models and ports (interfaces). No I/O lives here.

pub mod lp;
pub mod model;
pub mod ports;
