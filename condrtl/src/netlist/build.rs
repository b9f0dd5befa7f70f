use std::num::NonZeroUsize;

use awint::{awi::*, awint_dag::triple_arena::Arena};

use super::node::{MemBlock, Memory, Node, Nodes, Op, PMemory, PNode, Register, Wire};
use crate::{conditional::ConditionalUpdate, Error};

/// A runtime assertion that `bit` is never zero during simulation
#[derive(Debug, Clone)]
pub struct Assertion {
    pub bit: Wire,
    pub message: String,
}

/// A graph of combinational nodes and registers, plus the conditional update
/// compiler state that writes into it.
#[derive(Debug)]
pub struct Netlist {
    pub nodes: Nodes,
    pub memories: Arena<PMemory, MemBlock>,
    pub assertions: Vec<Assertion>,
    pub(crate) cond: ConditionalUpdate,
}

impl Default for Netlist {
    fn default() -> Self {
        Self::new()
    }
}

fn check_bw(lhs: usize, rhs: usize) -> Result<(), Error> {
    if lhs != rhs {
        Err(Error::BitwidthMismatch(lhs, rhs))
    } else {
        Ok(())
    }
}

impl Netlist {
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            memories: Arena::new(),
            assertions: vec![],
            cond: ConditionalUpdate::new(),
        }
    }

    fn make(&mut self, nzbw: NonZeroUsize, op: Op) -> Wire {
        let p_node = self.nodes.insert(Node { nzbw, op });
        Wire::new(p_node, nzbw)
    }

    /// Checks that `w` belongs to this netlist
    fn node(&self, w: Wire) -> Result<&Node, Error> {
        match self.nodes.get(w.p_node()) {
            Some(node) if node.nzbw == w.nzbw() => Ok(node),
            _ => Err(Error::InvalidPtr),
        }
    }

    pub fn input(&mut self, name: &str, w: NonZeroUsize) -> Wire {
        self.make(w, Op::Input(name.to_owned()))
    }

    pub fn literal(&mut self, bits: &Bits) -> Wire {
        self.make(bits.nzbw(), Op::Literal(Awi::from(bits)))
    }

    /// A literal of bitwidth `w` with the value of `x`, truncated or zero
    /// extended
    pub fn lit_u64(&mut self, x: u64, w: NonZeroUsize) -> Wire {
        let mut awi = Awi::zero(w);
        awi.u64_(x);
        self.make(w, Op::Literal(awi))
    }

    /// Creates a register that powers up to zero and has no next state driver
    pub fn register(&mut self, name: &str, w: NonZeroUsize) -> Register {
        Register::new(self.make(w, Op::Register {
            name: name.to_owned(),
            next: None,
        }))
    }

    /// Creates a forward declared wire, which must later be driven with
    /// [Netlist::drive] before it can be evaluated
    pub fn wire(&mut self, w: NonZeroUsize) -> Wire {
        self.make(w, Op::Wire(None))
    }

    pub fn drive(&mut self, wire: Wire, driver: Wire) -> Result<(), Error> {
        self.node(driver)?;
        check_bw(wire.bw(), driver.bw())?;
        let node = self
            .nodes
            .get_mut(wire.p_node())
            .ok_or(Error::InvalidPtr)?;
        match node.op {
            Op::Wire(None) => {
                node.op = Op::Wire(Some(driver.p_node()));
                Ok(())
            }
            Op::Wire(Some(_)) => Err(Error::WireAlreadyDriven),
            _ => Err(Error::OtherStr("`Netlist::drive` needs a forward declared wire")),
        }
    }

    pub fn memory(&mut self, name: &str, addr_w: NonZeroUsize, data_w: NonZeroUsize) -> Memory {
        Memory::new(self.memories.insert(MemBlock {
            name: name.to_owned(),
            addr_w,
            data_w,
        }))
    }

    /// Returns the constant value of `w` if it is a literal
    pub fn literal_value(&self, w: Wire) -> Result<Option<&Bits>, Error> {
        match &self.node(w)?.op {
            Op::Literal(awi) => Ok(Some(awi)),
            _ => Ok(None),
        }
    }

    pub fn register_name(&self, reg: Register) -> Result<&str, Error> {
        match &self.node(reg.wire())?.op {
            Op::Register { name, .. } => Ok(name),
            _ => Err(Error::InvalidPtr),
        }
    }

    pub fn register_next(&self, reg: Register) -> Result<Option<PNode>, Error> {
        match &self.node(reg.wire())?.op {
            Op::Register { next, .. } => Ok(*next),
            _ => Err(Error::InvalidPtr),
        }
    }

    /// Binds `next` as the synchronous next state input of `reg`. A register
    /// can only be bound once.
    pub fn bind_next(&mut self, reg: Register, next: Wire) -> Result<(), Error> {
        self.node(next)?;
        check_bw(reg.bw(), next.bw())?;
        let node = self
            .nodes
            .get_mut(reg.p_node())
            .ok_or(Error::InvalidPtr)?;
        match &mut node.op {
            Op::Register { name, next: driver } => {
                if driver.is_some() {
                    return Err(Error::AlreadyDriven(name.clone()))
                }
                *driver = Some(next.p_node());
                Ok(())
            }
            _ => Err(Error::InvalidPtr),
        }
    }

    /// Registers an assertion that `w` is never zero, checked on every
    /// simulated cycle
    pub fn assert_nonzero(&mut self, w: Wire, message: &str) -> Result<(), Error> {
        self.node(w)?;
        let zero = self.literal(&Awi::zero(w.nzbw()));
        let is_zero = self.eq(w, zero)?;
        let bit = self.not(is_zero)?;
        self.assertions.push(Assertion {
            bit,
            message: message.to_owned(),
        });
        Ok(())
    }
}

macro_rules! binary_same_bw {
    ($($fn:ident $op:ident),*,) => {
        $(
            pub fn $fn(&mut self, a: Wire, b: Wire) -> Result<Wire, Error> {
                self.node(a)?;
                self.node(b)?;
                check_bw(a.bw(), b.bw())?;
                Ok(self.make(a.nzbw(), Op::$op(a.p_node(), b.p_node())))
            }
        )*
    };
}

/// Combinational operations. Everything is bitwidth checked and nothing is
/// simplified.
impl Netlist {
    binary_same_bw!(
        and And,
        or Or,
        xor Xor,
        add Add,
    );

    pub fn not(&mut self, a: Wire) -> Result<Wire, Error> {
        self.node(a)?;
        Ok(self.make(a.nzbw(), Op::Not(a.p_node())))
    }

    pub fn eq(&mut self, a: Wire, b: Wire) -> Result<Wire, Error> {
        self.node(a)?;
        self.node(b)?;
        check_bw(a.bw(), b.bw())?;
        Ok(self.make(bw(1), Op::Eq(a.p_node(), b.p_node())))
    }

    /// Compares `a` against the literal `x`
    pub fn eq_u64(&mut self, a: Wire, x: u64) -> Result<Wire, Error> {
        let lit = self.lit_u64(x, a.nzbw());
        self.eq(a, lit)
    }

    /// Concatenates `parts`, with the first part ending up in the most
    /// significant position
    pub fn concat(&mut self, parts: &[Wire]) -> Result<Wire, Error> {
        let mut total = 0;
        for part in parts {
            self.node(*part)?;
            total += part.bw();
        }
        let nzbw = NonZeroUsize::new(total).ok_or(Error::OtherStr(
            "`Netlist::concat` needs at least one part",
        ))?;
        if parts.len() == 1 {
            return Ok(parts[0])
        }
        Ok(self.make(nzbw, Op::Concat(parts.iter().map(|w| w.p_node()).collect())))
    }

    /// Bits `lo..hi` of `a`
    pub fn slice(&mut self, a: Wire, lo: usize, hi: usize) -> Result<Wire, Error> {
        self.node(a)?;
        let out_of_bounds = Error::OutOfBounds { lo, hi, bw: a.bw() };
        if hi > a.bw() {
            return Err(out_of_bounds)
        }
        let nzbw = NonZeroUsize::new(hi.saturating_sub(lo)).ok_or(out_of_bounds)?;
        if nzbw == a.nzbw() {
            return Ok(a)
        }
        Ok(self.make(nzbw, Op::Slice {
            src: a.p_node(),
            lo,
        }))
    }

    pub fn bit(&mut self, a: Wire, i: usize) -> Result<Wire, Error> {
        self.slice(a, i, i + 1)
    }

    /// Truncates or zero extends `a` to `w`
    pub fn resize(&mut self, a: Wire, w: NonZeroUsize) -> Result<Wire, Error> {
        if a.bw() >= w.get() {
            self.slice(a, 0, w.get())
        } else {
            let pad = self.lit_u64(0, NonZeroUsize::new(w.get() - a.bw()).unwrap());
            self.concat(&[pad, a])
        }
    }

    /// The multiplexer primitive, `sel ? t : f`
    pub fn mux(&mut self, sel: Wire, t: Wire, f: Wire) -> Result<Wire, Error> {
        self.node(sel)?;
        self.node(t)?;
        self.node(f)?;
        check_bw(sel.bw(), 1)?;
        check_bw(t.bw(), f.bw())?;
        Ok(self.make(t.nzbw(), Op::Mux {
            sel: sel.p_node(),
            t: t.p_node(),
            f: f.p_node(),
        }))
    }
}
