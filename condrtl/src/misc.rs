mod error;
mod rng;

pub use error::Error;
pub use rng::{fill_bits, StarRng};
