mod lfsr;
mod prng;
mod stream;
mod taps;

pub use lfsr::{fibonacci_lfsr, galois_lfsr};
pub use prng::{prng, Generator, GeneratorPhase, PRNG_INIT_CYCLES, PRNG_LFSR_BW};
pub use stream::{stream_generator, STREAM_INIT_CYCLES, STREAM_SEED_BW};
pub use taps::{lfsr_taps, LFSR_TAP_TABLE};
