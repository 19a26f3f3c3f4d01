// Domain layer: resource models, role gating and ports. No HTTP here.

pub mod access;
pub mod model;
pub mod ports;
