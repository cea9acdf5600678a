mod order;
mod stock;

pub use order::*;
pub use stock::*;
