// Domain layer: document models, review results and ports.
// No I/O happens here.

pub mod model;
pub mod ports;
