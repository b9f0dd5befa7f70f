mod build;
mod node;
mod sim;

pub use build::{Assertion, Netlist};
pub use node::{MemBlock, Memory, Node, Op, PMemory, PNode, Register, Wire};
pub use sim::Simulation;
