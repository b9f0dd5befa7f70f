use core::fmt;
use std::fmt::Debug;

// Keep things using `OtherStr` and `OtherString` for special cases that users
// should not need to match against. Conversely, add special variants for things
// users might match against.

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, thiserror::Error)]
pub enum Error {
    /// This indicates an invalid `triple_arena::Ptr` was used, probably a
    /// handle from a different `Netlist`
    #[error("InvalidPtr")]
    InvalidPtr,
    /// If an operand has a bitwidth mismatch or unexpected bitwidth
    #[error("bitwidth mismatch: lhs: {0}, rhs: {1}")]
    BitwidthMismatch(usize, usize),
    /// A slice or bit index that does not fit in its source
    #[error("range {lo}..{hi} is out of bounds for a bitwidth of {bw}")]
    OutOfBounds { lo: usize, hi: usize, bw: usize },
    /// A conditional scope was opened while another one was still open
    #[error("a conditional scope is already open, conditional scopes cannot be nested")]
    ScopeAlreadyOpen,
    /// An operation that requires an open conditional scope was called while
    /// none was open
    #[error("there is no conditional scope that is currently open")]
    NoOpenScope,
    /// A guard was staged while a previously staged guard was still waiting
    /// for its block to be entered
    #[error("a guard is already staged and has not been entered")]
    GuardAlreadyStaged,
    /// A block was exited while a staged guard was never entered
    #[error("a staged guard was never entered before its enclosing block was exited")]
    UnconsumedGuard,
    /// A guarded block was entered with a staged guard but no enclosing scope
    #[error("a guarded block needs an enclosing conditional scope")]
    NoEnclosingScope,
    /// Registers can only be declared directly inside the outermost scope
    #[error("registers can only be declared at depth 1, but the current depth is {0}")]
    DeclareInNestedBlock(usize),
    /// A register was declared twice in the same scope
    #[error("register `{0}` was already declared in this conditional scope")]
    AlreadyDeclared(String),
    /// A register was written before it was declared in the current scope
    #[error("register `{0}` was written without being declared in this conditional scope")]
    Undeclared(String),
    /// A register was written outside of any guarded block
    #[error("register `{0}` was written outside of any guarded block")]
    UnguardedWrite(String),
    /// A register was declared but never written by the time its scope closed
    #[error("register `{0}` was declared in a conditional scope but never assigned")]
    Unassigned(String),
    /// A register already has a next state driver
    #[error("register `{0}` already has a next state driver")]
    AlreadyDriven(String),
    /// A forward declared wire was driven twice
    #[error("wire was already driven")]
    WireAlreadyDriven,
    /// The nesting depth of the conditional compiler would have become
    /// negative. This is an internal invariant violation and poisons the
    /// compiler.
    #[error("internal error: conditional nesting depth would become negative")]
    NegativeDepth,
    /// The conditional compiler hit an internal error earlier and refuses to
    /// continue
    #[error("the conditional compiler was poisoned by an earlier internal error")]
    Poisoned,
    /// There is no tap table entry for this LFSR width
    #[error("LFSR bitwidth {0} is either illegal or not supported")]
    UnsupportedWidth(usize),
    /// An LFSR was constructed with a seed that is constant zero
    #[error("LFSR must start in a non-zero seed state")]
    ZeroSeed,
    /// Surfaces that are declared but not implemented yet
    #[error("unimplemented: {0}")]
    Unimplemented(&'static str),
    /// An `assert_nonzero` signal was zero during simulation
    #[error("assertion failed on cycle {cycle}: {message}")]
    AssertionFailure { message: String, cycle: u64 },
    /// A forward declared wire was evaluated without ever being driven
    #[error("evaluated a wire of bitwidth {0} that was never driven")]
    Undriven(usize),
    /// An input was evaluated before it was given a value
    #[error("input `{0}` was never set")]
    UnsetInput(String),
    /// Evaluation found a cycle that does not pass through a register
    #[error("combinational loop found during evaluation")]
    CombinationalLoop,
    /// For miscellanious errors
    #[error("{0}")]
    OtherStr(&'static str),
    /// For miscellanious errors
    #[error("{0}")]
    OtherString(String),
}

impl Error {
    /// Returns if this error is an internal invariant violation rather than
    /// caller misuse
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::NegativeDepth | Error::Poisoned)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
