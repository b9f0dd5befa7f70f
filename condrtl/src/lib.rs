//! This provides the conditional update compiler of a small HDL (Hardware
//! Design Language), along with shift register based random generators that
//! are built with it.
//!
//! Circuits are described by building a [Netlist] of combinational nodes and
//! registers. Instead of driving each register's next state by hand, nested
//! guarded blocks that read like `if`/`else if`/`else` can be written with
//! [Netlist::conditional], [Netlist::when], and [Netlist::otherwise]. When the
//! outermost block closes, every register written inside of it gets a
//! priority ordered chain of multiplexers as its next state. A [Simulation]
//! evaluates the resulting circuit cycle by cycle.
//!
//! All values are arbitrary width integers from `awint`.
//!
//! ```
//! use condrtl::{awi::*, prng, Netlist, Simulation};
//!
//! let mut netlist = Netlist::new();
//! let request = netlist.input("request", bw(1));
//! let load = netlist.input("load", bw(1));
//! let seed = netlist.input("seed", bw(39));
//! let rand = prng(&mut netlist, 8, request, load, Some(seed)).unwrap();
//!
//! let mut sim = Simulation::new(&netlist);
//! sim.set_u64(seed, 0x12_3456_789a).unwrap();
//! sim.set_u64(request, 0).unwrap();
//!
//! // load the seed and wait for it to mix in
//! sim.set_u64(load, 1).unwrap();
//! sim.step().unwrap();
//! sim.set_u64(load, 0).unwrap();
//! while !sim.is_set(rand.ready).unwrap() {
//!     sim.step().unwrap();
//! }
//!
//! // request a random number
//! sim.set_u64(request, 1).unwrap();
//! sim.step().unwrap();
//! sim.set_u64(request, 0).unwrap();
//! while !sim.is_set(rand.ready).unwrap() {
//!     sim.step().unwrap();
//! }
//! let _random_u8 = sim.value(rand.value.wire()).unwrap().to_u8();
//! ```

pub mod conditional;
/// LFSRs and random generators
pub mod generators;
/// Miscellanious utilities
pub mod misc;
/// The netlist and its simulator
pub mod netlist;

pub use awint;
pub use conditional::{ConditionalUpdate, Pending};
pub use generators::{
    fibonacci_lfsr, galois_lfsr, lfsr_taps, prng, stream_generator, Generator, GeneratorPhase,
};
pub use misc::Error;
pub use netlist::{Memory, Netlist, Register, Simulation, Wire};

/// Reexports all the regular arbitrary width integer structs, macros, common
/// enums, and most of `core::primitive::*`.
pub mod awi {
    pub use awint::awi::*;
    pub use Option::{None, Some};
    pub use Result::{Err, Ok};
}
