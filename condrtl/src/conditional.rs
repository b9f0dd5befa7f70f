//! The conditional update compiler. Guarded writes to registers are recorded
//! while a conditional scope is open, and when the outermost scope closes
//! every declared register has its writes folded into one priority ordered
//! chain of multiplexers that becomes its next state input.
//!
//! ```
//! use condrtl::{awi::*, Netlist, Simulation};
//!
//! let mut netlist = Netlist::new();
//! let a = netlist.input("a", bw(1));
//! let b = netlist.input("b", bw(1));
//! let x = netlist.lit_u64(1, bw(4));
//! let y = netlist.lit_u64(2, bw(4));
//! let z = netlist.lit_u64(3, bw(4));
//! let r = netlist.register("r", bw(4));
//!
//! netlist
//!     .conditional(|netlist| {
//!         netlist.declare(r)?;
//!         // if a
//!         netlist.when(a, |netlist| netlist.write(r, x))?;
//!         // elif b
//!         netlist.when(b, |netlist| netlist.write(r, y))?;
//!         // else
//!         netlist.otherwise(|netlist| netlist.write(r, z))
//!     })
//!     .unwrap();
//!
//! let mut sim = Simulation::new(&netlist);
//! sim.set_u64(a, 0).unwrap();
//! sim.set_u64(b, 1).unwrap();
//! sim.step().unwrap();
//! assert_eq!(sim.value(r.wire()).unwrap().to_u64(), 2);
//! ```

use awint::awint_dag::triple_arena::{ptr_struct, OrdArena};
use log::debug;

use crate::{netlist::PNode, Error, Memory, Netlist, Register, Wire};

ptr_struct!(PLog);

/// A guard that was staged but whose block has not been entered yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    None,
    Guard(Wire),
    /// The catch-all branch
    Default,
}

/// One sibling at some nesting level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Guard {
    Wire(Wire),
    Default,
}

/// The state of the conditional update compiler
#[derive(Debug, Clone)]
pub struct ConditionalUpdate {
    /// Zero when closed
    depth: usize,
    pending: Pending,
    /// Sibling guards per nesting level. Only the last level may be empty.
    levels: Vec<Vec<Guard>>,
    /// The guarded writes of each declared register in program order, keyed
    /// by the register node
    writes: OrdArena<PLog, PNode, (Register, Vec<(Wire, Wire)>)>,
    /// Declaration order
    declared: Vec<PLog>,
    poisoned: bool,
}

impl Default for ConditionalUpdate {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionalUpdate {
    pub fn new() -> Self {
        Self {
            depth: 0,
            pending: Pending::None,
            levels: vec![],
            writes: OrdArena::new(),
            declared: vec![],
            poisoned: false,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn pending(&self) -> Pending {
        self.pending
    }

    pub fn is_open(&self) -> bool {
        self.depth != 0
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    fn check_poisoned(&self) -> Result<(), Error> {
        if self.poisoned {
            Err(Error::Poisoned)
        } else {
            Ok(())
        }
    }

    /// The number of registers declared in the open scope
    pub fn num_declared(&self) -> usize {
        self.declared.len()
    }

    pub fn is_declared(&self, reg: Register) -> bool {
        self.writes.find_key(&reg.p_node()).is_some()
    }

    fn log_mut(&mut self, reg: Register) -> Option<&mut Vec<(Wire, Wire)>> {
        let p_log = self.writes.find_key(&reg.p_node())?;
        self.writes.get_val_mut(p_log).map(|(_, log)| log)
    }

    /// Takes the declared registers and their writes in declaration order
    fn take_writes(&mut self) -> Vec<(Register, Vec<(Wire, Wire)>)> {
        let mut writes = std::mem::replace(&mut self.writes, OrdArena::new());
        std::mem::take(&mut self.declared)
            .into_iter()
            .filter_map(|p_log| {
                writes
                    .get_val_mut(p_log)
                    .map(|(reg, log)| (*reg, std::mem::take(log)))
            })
            .collect()
    }

    /// Returns to the closed state, keeping poison
    fn reset(&mut self) {
        let poisoned = self.poisoned;
        *self = Self::new();
        self.poisoned = poisoned;
    }
}

/// Low level conditional operations. The closure based [Netlist::conditional],
/// [Netlist::when], and [Netlist::otherwise] should be preferred.
impl Netlist {
    pub fn conditional_depth(&self) -> usize {
        self.cond.depth()
    }

    /// The live state of the conditional compiler
    pub fn conditional_state(&self) -> &ConditionalUpdate {
        &self.cond
    }

    /// Opens the outermost conditional scope. Fails if one is already open,
    /// without changing the open one.
    pub fn open_conditional(&mut self) -> Result<(), Error> {
        self.cond.check_poisoned()?;
        if self.cond.is_open() {
            return Err(Error::ScopeAlreadyOpen)
        }
        self.enter_block()
    }

    /// Stages `guard` for the next [Netlist::enter_block]
    pub fn stage(&mut self, guard: Wire) -> Result<(), Error> {
        if guard.bw() != 1 {
            return Err(Error::BitwidthMismatch(guard.bw(), 1))
        }
        self.stage_pending(Pending::Guard(guard))
    }

    /// Stages the catch-all guard, equivalent to staging a constant true
    pub fn stage_default(&mut self) -> Result<(), Error> {
        self.stage_pending(Pending::Default)
    }

    fn stage_pending(&mut self, pending: Pending) -> Result<(), Error> {
        self.cond.check_poisoned()?;
        if !self.cond.is_open() {
            return Err(Error::NoOpenScope)
        }
        if self.cond.pending != Pending::None {
            return Err(Error::GuardAlreadyStaged)
        }
        self.cond.pending = pending;
        Ok(())
    }

    /// With no staged guard this opens the outermost scope, otherwise it
    /// enters a nested block using the staged guard as the next sibling of
    /// the innermost level.
    pub fn enter_block(&mut self) -> Result<(), Error> {
        self.cond.check_poisoned()?;
        let cond = &mut self.cond;
        let guard = match cond.pending {
            Pending::None => {
                if cond.depth != 0 {
                    return Err(Error::ScopeAlreadyOpen)
                }
                debug!("opening conditional scope");
                cond.levels.push(vec![]);
                cond.depth = 1;
                return Ok(())
            }
            Pending::Guard(wire) => Guard::Wire(wire),
            Pending::Default => Guard::Default,
        };
        if cond.depth == 0 {
            return Err(Error::NoEnclosingScope)
        }
        // `levels.len() == depth` while open
        cond.levels.last_mut().unwrap().push(guard);
        cond.levels.push(vec![]);
        cond.depth += 1;
        cond.pending = Pending::None;
        Ok(())
    }

    /// Exits the innermost block. Exiting the outermost scope finalizes all
    /// declared registers.
    pub fn exit_block(&mut self) -> Result<(), Error> {
        self.cond.check_poisoned()?;
        if self.cond.depth == 0 {
            self.cond.poisoned = true;
            return Err(Error::NegativeDepth)
        }
        if self.cond.pending != Pending::None {
            return Err(Error::UnconsumedGuard)
        }
        self.cond.levels.pop();
        self.cond.depth -= 1;
        if self.cond.depth == 0 {
            let res = self.finalize_registers();
            self.cond.reset();
            debug!("closed conditional scope");
            res
        } else {
            Ok(())
        }
    }

    /// Declares `reg` as conditionally written in the current scope. Only
    /// allowed directly inside the outermost scope.
    pub fn declare(&mut self, reg: Register) -> Result<(), Error> {
        self.cond.check_poisoned()?;
        let name = self.register_name(reg)?.to_owned();
        match self.cond.depth {
            0 => return Err(Error::NoOpenScope),
            1 => (),
            depth => return Err(Error::DeclareInNestedBlock(depth)),
        }
        if self.cond.is_declared(reg) {
            return Err(Error::AlreadyDeclared(name))
        }
        let (p_log, _) = self.cond.writes.insert(reg.p_node(), (reg, vec![]));
        self.cond.declared.push(p_log);
        Ok(())
    }

    /// Records that `reg` takes on `value` on the next cycle under the
    /// current guard
    pub fn write(&mut self, reg: Register, value: Wire) -> Result<(), Error> {
        self.cond.check_poisoned()?;
        let name = self.register_name(reg)?.to_owned();
        if !self.cond.is_open() {
            return Err(Error::NoOpenScope)
        }
        if reg.bw() != value.bw() {
            return Err(Error::BitwidthMismatch(reg.bw(), value.bw()))
        }
        if !self.cond.is_declared(reg) {
            return Err(Error::Undeclared(name))
        }
        let guard = self
            .current_guard()?
            .ok_or_else(|| Error::UnguardedWrite(name.clone()))?;
        match self.cond.log_mut(reg) {
            Some(log) => {
                log.push((guard, value));
                Ok(())
            }
            None => Err(Error::Undeclared(name)),
        }
    }

    /// For every level except the innermost, the last sibling is conjoined
    /// with the negation of all earlier siblings, and the per level terms are
    /// conjoined. Returns `None` if no level has a sibling.
    fn current_guard(&mut self) -> Result<Option<Wire>, Error> {
        let levels = self.cond.levels.clone();
        let mut select: Option<Wire> = None;
        let mut contributed = false;
        for siblings in &levels[..(levels.len() - 1)] {
            let (current, earlier) = match siblings.split_last() {
                Some(x) => x,
                None => continue,
            };
            contributed = true;
            for sibling in earlier {
                let term = match sibling {
                    Guard::Wire(wire) => self.not(*wire)?,
                    // `!true`
                    Guard::Default => self.lit_u64(0, awint::bw(1)),
                };
                select = Some(self.and_with_possible_none(select, term)?);
            }
            if let Guard::Wire(wire) = current {
                select = Some(self.and_with_possible_none(select, *wire)?);
            }
        }
        if !contributed {
            return Ok(None)
        }
        Ok(Some(match select {
            Some(select) => select,
            // only catch-all branches
            None => self.lit_u64(1, awint::bw(1)),
        }))
    }

    fn and_with_possible_none(&mut self, a: Option<Wire>, b: Wire) -> Result<Wire, Error> {
        match a {
            Some(a) => self.and(a, b),
            None => Ok(b),
        }
    }

    /// Validates every declared register before binding anything, so that a
    /// failure leaves no partial drivers behind
    fn finalize_registers(&mut self) -> Result<(), Error> {
        let writes = self.cond.take_writes();
        for (reg, log) in &writes {
            if log.is_empty() {
                return Err(Error::Unassigned(self.register_name(*reg)?.to_owned()))
            }
            if self.register_next(*reg)?.is_some() {
                return Err(Error::AlreadyDriven(self.register_name(*reg)?.to_owned()))
            }
        }
        for (reg, log) in writes {
            // later writes wrap earlier ones and therefore take priority
            let mut res = reg.wire();
            for (guard, value) in &log {
                res = self.mux(*guard, *value, res)?;
            }
            debug!(
                "folded {} guarded writes into `{}`",
                log.len(),
                self.register_name(reg)?
            );
            self.bind_next(reg, res)?;
        }
        Ok(())
    }

    /// Abandons the open scope without binding anything
    fn abort_conditional(&mut self) {
        if self.cond.is_open() {
            debug!("aborting conditional scope");
            self.cond.reset();
        }
    }
}

/// Closure based conditional blocks
impl Netlist {
    /// Opens the outermost conditional scope, runs `f`, and closes the scope.
    /// If `f` or finalization fails, nothing is bound and the scope is
    /// closed.
    pub fn conditional<T, F: FnOnce(&mut Self) -> Result<T, Error>>(
        &mut self,
        f: F,
    ) -> Result<T, Error> {
        self.open_conditional()?;
        match f(self) {
            Ok(t) => {
                if self.cond.depth != 1 {
                    self.abort_conditional();
                    return Err(Error::OtherStr(
                        "guarded blocks inside `Netlist::conditional` were left unbalanced",
                    ))
                }
                self.exit_block()?;
                Ok(t)
            }
            Err(e) => {
                self.abort_conditional();
                Err(e)
            }
        }
    }

    /// A guarded block that is exclusive with the earlier sibling blocks at
    /// the same depth and conjoined with the blocks it is nested in
    pub fn when<T, F: FnOnce(&mut Self) -> Result<T, Error>>(
        &mut self,
        guard: Wire,
        f: F,
    ) -> Result<T, Error> {
        self.stage(guard)?;
        self.enter_block()?;
        let t = f(self)?;
        self.exit_block()?;
        Ok(t)
    }

    /// The catch-all block taken when no earlier sibling was
    pub fn otherwise<T, F: FnOnce(&mut Self) -> Result<T, Error>>(
        &mut self,
        f: F,
    ) -> Result<T, Error> {
        self.stage_default()?;
        self.enter_block()?;
        let t = f(self)?;
        self.exit_block()?;
        Ok(t)
    }
}

/// Conditional writes to memories are not supported yet
impl Netlist {
    pub fn declare_memory(&mut self, _mem: Memory) -> Result<(), Error> {
        Err(Error::Unimplemented("conditional memory declaration"))
    }

    pub fn read_memory(&mut self, _mem: Memory, _addr: Wire) -> Result<Wire, Error> {
        Err(Error::Unimplemented("conditional memory reads"))
    }

    pub fn write_memory(
        &mut self,
        _mem: Memory,
        _addr: Wire,
        _data: Wire,
        _enable: Wire,
    ) -> Result<(), Error> {
        Err(Error::Unimplemented("conditional memory writes"))
    }
}
