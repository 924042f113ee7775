// Domain layer: postal code models and the ports the pipeline is generic over.

pub mod model;
pub mod ports;
pub mod postal_code;
