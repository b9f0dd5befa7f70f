use std::num::NonZeroUsize;

use awint::{
    awi::*,
    awint_dag::triple_arena::{ptr_struct, OrdArena},
};
use log::trace;

use super::{
    build::Netlist,
    node::{Op, PNode, Register, Wire},
};
use crate::Error;

/// A cycle accurate evaluator of a `Netlist`. Registers power up to zero, and
/// input values persist between cycles until they are set again.
///
/// ```
/// use condrtl::{awi::*, Netlist, Simulation};
///
/// let mut netlist = Netlist::new();
/// let counter = netlist.register("counter", bw(4));
/// let one = netlist.lit_u64(1, bw(4));
/// let inc = netlist.add(counter.wire(), one).unwrap();
/// netlist.bind_next(counter, inc).unwrap();
///
/// let mut sim = Simulation::new(&netlist);
/// for i in 0..20u64 {
///     assert_eq!(sim.value(counter.wire()).unwrap().to_u64(), i % 16);
///     sim.step().unwrap();
/// }
/// ```
#[derive(Debug)]
pub struct Simulation<'a> {
    netlist: &'a Netlist,
    /// Registers in node order
    registers: Vec<PNode>,
    regs: Values,
    inputs: Values,
    cycle: u64,
}

ptr_struct!(PValue);

/// Per node values keyed by the node they belong to
type Values = OrdArena<PValue, PNode, Awi>;

fn lookup(values: &Values, p_node: PNode) -> Option<&Awi> {
    values.find_key(&p_node).and_then(|p| values.get_val(p))
}

fn lookup_mut(values: &mut Values, p_node: PNode) -> Option<&mut Awi> {
    let p = values.find_key(&p_node)?;
    values.get_val_mut(p)
}

/// Operands are always evaluated before their users
fn cached(cache: &Values, p_node: PNode) -> Result<&Awi, Error> {
    lookup(cache, p_node).ok_or(Error::OtherStr("operand was not evaluated"))
}

impl<'a> Simulation<'a> {
    pub fn new(netlist: &'a Netlist) -> Self {
        let mut registers = vec![];
        let mut regs = OrdArena::new();
        for (p_node, node) in netlist.nodes.iter() {
            if let Op::Register { .. } = node.op {
                registers.push(p_node);
                let _ = regs.insert(p_node, Awi::zero(node.nzbw));
            }
        }
        Self {
            netlist,
            registers,
            regs,
            inputs: OrdArena::new(),
            cycle: 0,
        }
    }

    /// The number of clock edges that have happened
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Sets the value of an input, which persists until it is set again
    pub fn set(&mut self, input: Wire, value: &Bits) -> Result<(), Error> {
        let node = self
            .netlist
            .nodes
            .get(input.p_node())
            .ok_or(Error::InvalidPtr)?;
        if !matches!(node.op, Op::Input(_)) {
            return Err(Error::OtherStr("`Simulation::set` needs an input wire"))
        }
        if node.nzbw != value.nzbw() {
            return Err(Error::BitwidthMismatch(node.nzbw.get(), value.bw()))
        }
        // replaces any earlier value
        let _ = self.inputs.insert(input.p_node(), Awi::from(value));
        Ok(())
    }

    /// Sets an input to `x`, truncated or zero extended
    pub fn set_u64(&mut self, input: Wire, x: u64) -> Result<(), Error> {
        let mut value = Awi::zero(input.nzbw());
        value.u64_(x);
        self.set(input, &value)
    }

    /// Overwrites the current state of a register
    pub fn poke(&mut self, reg: Register, value: &Bits) -> Result<(), Error> {
        let state = lookup_mut(&mut self.regs, reg.p_node()).ok_or(Error::InvalidPtr)?;
        state
            .copy_(value)
            .ok_or(Error::BitwidthMismatch(reg.bw(), value.bw()))
    }

    /// Evaluates `w` for the current cycle, using the current register states
    /// and inputs
    pub fn value(&self, w: Wire) -> Result<Awi, Error> {
        let mut cache = Values::new();
        self.eval(w.p_node(), &mut cache)
    }

    /// Evaluates the single bit `w` for the current cycle
    pub fn is_set(&self, w: Wire) -> Result<bool, Error> {
        Ok(self.value(w)?.to_bool())
    }

    /// Checks all assertions against the current cycle, then latches every
    /// register that has a next state driver
    pub fn step(&mut self) -> Result<(), Error> {
        let mut cache = Values::new();
        for assertion in &self.netlist.assertions {
            if self.eval(assertion.bit.p_node(), &mut cache)?.is_zero() {
                return Err(Error::AssertionFailure {
                    message: assertion.message.clone(),
                    cycle: self.cycle,
                })
            }
        }
        let mut latched = vec![];
        for p_reg in &self.registers {
            if let Op::Register {
                next: Some(p_next), ..
            } = self.netlist.nodes[*p_reg].op
            {
                latched.push((*p_reg, self.eval(p_next, &mut cache)?));
            }
        }
        for (p_reg, value) in latched {
            let _ = self.regs.insert(p_reg, value);
        }
        trace!("cycle {} latched", self.cycle);
        self.cycle += 1;
        Ok(())
    }

    /// Steps `n` times
    pub fn run(&mut self, n: u64) -> Result<(), Error> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    fn eval(&self, root: PNode, cache: &mut Values) -> Result<Awi, Error> {
        // explicit DFS, nodes with a `true` flag have had their operands pushed
        let mut stack = vec![(root, false)];
        let mut in_progress = OrdArena::<PValue, PNode, ()>::new();
        while let Some((p_node, expanded)) = stack.pop() {
            if lookup(cache, p_node).is_some() {
                continue
            }
            let node = self.netlist.nodes.get(p_node).ok_or(Error::InvalidPtr)?;
            if expanded {
                let value = self.eval_op(p_node, &node.op, node.nzbw, cache)?;
                if let Some(p) = in_progress.find_key(&p_node) {
                    let _ = in_progress.remove(p);
                }
                let _ = cache.insert(p_node, value);
            } else {
                if in_progress.find_key(&p_node).is_some() {
                    return Err(Error::CombinationalLoop)
                }
                let _ = in_progress.insert(p_node, ());
                stack.push((p_node, true));
                for operand in node.op.operands() {
                    if lookup(cache, operand).is_none() {
                        stack.push((operand, false));
                    }
                }
            }
        }
        Ok(cached(cache, root)?.clone())
    }

    /// Evaluates `op` assuming all of its operands are in `cache`
    fn eval_op(
        &self,
        p_node: PNode,
        op: &Op,
        nzbw: NonZeroUsize,
        cache: &Values,
    ) -> Result<Awi, Error> {
        let bitwidth_err = || Error::OtherStr("bitwidth mismatch found during evaluation");
        let res = match op {
            Op::Input(name) => lookup(&self.inputs, p_node)
                .cloned()
                .ok_or_else(|| Error::UnsetInput(name.clone()))?,
            Op::Literal(value) => value.clone(),
            Op::Register { .. } => lookup(&self.regs, p_node)
                .cloned()
                .ok_or(Error::InvalidPtr)?,
            Op::Wire(driver) => match driver {
                Some(p) => cached(cache, *p)?.clone(),
                None => return Err(Error::Undriven(nzbw.get())),
            },
            Op::Not(a) => {
                let mut res = cached(cache, *a)?.clone();
                res.not_();
                res
            }
            Op::And(a, b) => {
                let mut res = cached(cache, *a)?.clone();
                res.and_(cached(cache, *b)?).ok_or_else(bitwidth_err)?;
                res
            }
            Op::Or(a, b) => {
                let mut res = cached(cache, *a)?.clone();
                res.or_(cached(cache, *b)?).ok_or_else(bitwidth_err)?;
                res
            }
            Op::Xor(a, b) => {
                let mut res = cached(cache, *a)?.clone();
                res.xor_(cached(cache, *b)?).ok_or_else(bitwidth_err)?;
                res
            }
            Op::Add(a, b) => {
                let mut res = cached(cache, *a)?.clone();
                res.add_(cached(cache, *b)?).ok_or_else(bitwidth_err)?;
                res
            }
            Op::Eq(a, b) => {
                let eq = cached(cache, *a)?
                    .const_eq(cached(cache, *b)?)
                    .ok_or_else(bitwidth_err)?;
                Awi::from_bool(eq)
            }
            Op::Concat(parts) => {
                let mut res = Awi::zero(nzbw);
                let mut to = 0;
                for part in parts.iter().rev() {
                    let part = cached(cache, *part)?;
                    res.field(to, part, 0, part.bw()).ok_or_else(bitwidth_err)?;
                    to += part.bw();
                }
                res
            }
            Op::Slice { src, lo } => {
                let mut res = Awi::zero(nzbw);
                res.field(0, cached(cache, *src)?, *lo, nzbw.get())
                    .ok_or_else(bitwidth_err)?;
                res
            }
            Op::Mux { sel, t, f } => {
                if cached(cache, *sel)?.to_bool() {
                    cached(cache, *t)?.clone()
                } else {
                    cached(cache, *f)?.clone()
                }
            }
        };
        Ok(res)
    }
}
