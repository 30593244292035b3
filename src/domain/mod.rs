// Domain layer: posting model, run results and the ports the pipeline is built on.

pub mod model;
pub mod ports;
