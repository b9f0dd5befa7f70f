use std::num::NonZeroUsize;

use awint::{
    awi::*,
    awint_dag::triple_arena::{ptr_struct, Arena},
};

ptr_struct!(PNode);
ptr_struct!(PMemory);

/// The operation of a `Node`. Operands point to other `Node`s in the same
/// `Netlist`.
#[derive(Debug, Clone)]
pub enum Op {
    /// A named external input
    Input(String),
    /// A constant
    Literal(Awi),
    /// A synchronous register. The node itself is the current-cycle value and
    /// `next` is the value latched at the clock edge, if there is a driver.
    Register { name: String, next: Option<PNode> },
    /// A forward declared wire, `None` until driven
    Wire(Option<PNode>),
    Not(PNode),
    And(PNode, PNode),
    Or(PNode, PNode),
    Xor(PNode, PNode),
    /// Wrapping addition of equal width operands
    Add(PNode, PNode),
    /// Single bit equality comparison
    Eq(PNode, PNode),
    /// Concatenation, most significant operand first
    Concat(Vec<PNode>),
    /// Bits `lo..(lo + nzbw)` of the source
    Slice { src: PNode, lo: usize },
    /// `sel ? t : f`
    Mux { sel: PNode, t: PNode, f: PNode },
}

impl Op {
    pub fn operands(&self) -> Vec<PNode> {
        match self {
            Op::Input(_) | Op::Literal(_) | Op::Register { .. } => vec![],
            Op::Wire(driver) => driver.iter().copied().collect(),
            Op::Not(a) => vec![*a],
            Op::And(a, b) | Op::Or(a, b) | Op::Xor(a, b) | Op::Add(a, b) | Op::Eq(a, b) => {
                vec![*a, *b]
            }
            Op::Concat(v) => v.clone(),
            Op::Slice { src, .. } => vec![*src],
            Op::Mux { sel, t, f } => vec![*sel, *t, *f],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub nzbw: NonZeroUsize,
    pub op: Op,
}

/// A handle to the value of some `Node` in a `Netlist`
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Wire {
    p_node: PNode,
    nzbw: NonZeroUsize,
}

impl Wire {
    pub(crate) fn new(p_node: PNode, nzbw: NonZeroUsize) -> Self {
        Self { p_node, nzbw }
    }

    pub fn p_node(&self) -> PNode {
        self.p_node
    }

    pub fn nzbw(&self) -> NonZeroUsize {
        self.nzbw
    }

    pub fn bw(&self) -> usize {
        self.nzbw.get()
    }
}

/// A handle to a register. The `PNode` of the register is its identity.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Register {
    wire: Wire,
}

impl Register {
    pub(crate) fn new(wire: Wire) -> Self {
        Self { wire }
    }

    /// The current-cycle value of the register
    pub fn wire(&self) -> Wire {
        self.wire
    }

    pub fn p_node(&self) -> PNode {
        self.wire.p_node()
    }

    pub fn nzbw(&self) -> NonZeroUsize {
        self.wire.nzbw()
    }

    pub fn bw(&self) -> usize {
        self.wire.bw()
    }
}

impl From<Register> for Wire {
    fn from(reg: Register) -> Self {
        reg.wire
    }
}

/// Declaration of an addressable memory
#[derive(Debug, Clone)]
pub struct MemBlock {
    pub name: String,
    pub addr_w: NonZeroUsize,
    pub data_w: NonZeroUsize,
}

/// A handle to a `MemBlock`
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Memory {
    p_mem: PMemory,
}

impl Memory {
    pub(crate) fn new(p_mem: PMemory) -> Self {
        Self { p_mem }
    }

    pub fn p_mem(&self) -> PMemory {
        self.p_mem
    }
}

pub(crate) type Nodes = Arena<PNode, Node>;
