use std::num::NonZeroUsize;

use awint::awi::*;

use super::lfsr::galois_lfsr;
use crate::{misc::StarRng, Error, Netlist, Register, Wire};

/// The bitwidth of the Galois LFSR inside of [prng]
pub const PRNG_LFSR_BW: usize = 39;
/// The number of bits discarded after seeding a [prng], one per LFSR bit
pub const PRNG_INIT_CYCLES: usize = PRNG_LFSR_BW;

/// The two phases of a generator controller
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum GeneratorPhase {
    /// Discarding output after seeding
    Init,
    /// Shifting output bits into the value register
    Generate,
}

impl GeneratorPhase {
    /// The value of the single bit phase register in this phase
    pub fn encoding(self) -> u64 {
        match self {
            GeneratorPhase::Init => 0,
            GeneratorPhase::Generate => 1,
        }
    }

    pub fn from_bit(bit: bool) -> Self {
        if bit {
            GeneratorPhase::Generate
        } else {
            GeneratorPhase::Init
        }
    }
}

/// The registers and signals of a built generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generator {
    /// The generated random value
    pub value: Register,
    /// Set when neither `load` nor `request` is set and the current phase has
    /// run to completion
    pub ready: Wire,
    /// A single bit register with the encoding of [GeneratorPhase]
    pub phase: Register,
    /// Counts cycles in the current phase
    pub counter: Register,
}

pub(crate) fn check_control(request: Wire, load: Wire) -> Result<(), Error> {
    if request.bw() != 1 {
        return Err(Error::BitwidthMismatch(request.bw(), 1))
    }
    if load.bw() != 1 {
        return Err(Error::BitwidthMismatch(load.bw(), 1))
    }
    Ok(())
}

pub(crate) fn value_bw(w: usize) -> Result<NonZeroUsize, Error> {
    NonZeroUsize::new(w).ok_or(Error::OtherStr("a generator needs a nonzero bitwidth"))
}

/// Bitwidth of a counter that can reach the larger of the two phase targets
pub(crate) fn counter_bw(w: usize, init_cycles: usize) -> NonZeroUsize {
    let max = w.max(init_cycles).max(1);
    NonZeroUsize::new((usize::BITS - max.leading_zeros()) as usize).unwrap()
}

/// The `Init`/`Generate` controller shared by the generators
#[derive(Debug, Clone, Copy)]
pub(crate) struct Controller {
    request: Wire,
    load: Wire,
    value: Register,
    counter: Register,
    phase: Register,
    in_init: Wire,
    in_generate: Wire,
    init_pending: Wire,
    generate_pending: Wire,
    ready: Wire,
}

impl Controller {
    pub(crate) fn new(
        netlist: &mut Netlist,
        w: NonZeroUsize,
        init_cycles: usize,
        request: Wire,
        load: Wire,
    ) -> Result<Self, Error> {
        let value = netlist.register("rand", w);
        let counter = netlist.register("counter", counter_bw(w.get(), init_cycles));
        let phase = netlist.register("state", bw(1));

        let init_done = netlist.eq_u64(counter.wire(), init_cycles as u64)?;
        let generate_done = netlist.eq_u64(counter.wire(), w.get() as u64)?;
        let in_init = netlist.eq_u64(phase.wire(), GeneratorPhase::Init.encoding())?;
        let in_generate = netlist.eq_u64(phase.wire(), GeneratorPhase::Generate.encoding())?;
        let init_pending = netlist.not(init_done)?;
        let generate_pending = netlist.not(generate_done)?;

        let not_load = netlist.not(load)?;
        let not_request = netlist.not(request)?;
        let idle = netlist.and(not_load, not_request)?;
        let init_finished = netlist.and(in_init, init_done)?;
        let generate_finished = netlist.and(in_generate, generate_done)?;
        let finished = netlist.or(init_finished, generate_finished)?;
        let ready = netlist.and(idle, finished)?;
        Ok(Self {
            request,
            load,
            value,
            counter,
            phase,
            in_init,
            in_generate,
            init_pending,
            generate_pending,
            ready,
        })
    }

    /// Set on every cycle the generator needs its entropy source to advance
    pub(crate) fn advancing(&self, netlist: &mut Netlist) -> Result<Wire, Error> {
        let init_running = netlist.and(self.in_init, self.init_pending)?;
        let generate_running = netlist.and(self.in_generate, self.generate_pending)?;
        netlist.or(init_running, generate_running)
    }

    /// Builds the conditional updates of the controller registers. `state`
    /// lists extra registers that `on_load` and `on_advance` write. `bit` is
    /// shifted into the least significant end of the value each `Generate`
    /// cycle.
    pub(crate) fn drive<L, A>(
        &self,
        netlist: &mut Netlist,
        state: &[Register],
        on_load: L,
        on_advance: A,
        bit: Wire,
    ) -> Result<(), Error>
    where
        L: FnOnce(&mut Netlist) -> Result<(), Error>,
        A: Fn(&mut Netlist) -> Result<(), Error>,
    {
        let counter_bw = self.counter.nzbw();
        let counter_zero = netlist.lit_u64(0, counter_bw);
        let one = netlist.lit_u64(1, counter_bw);
        let counter_inc = netlist.add(self.counter.wire(), one)?;
        let value_zero = netlist.lit_u64(0, self.value.nzbw());
        let init = netlist.lit_u64(GeneratorPhase::Init.encoding(), bw(1));
        let generate = netlist.lit_u64(GeneratorPhase::Generate.encoding(), bw(1));
        let w = self.value.bw();
        let shifted = if w == 1 {
            bit
        } else {
            let rest = netlist.slice(self.value.wire(), 0, w - 1)?;
            netlist.concat(&[rest, bit])?
        };

        let ctrl = *self;
        netlist.conditional(|netlist| {
            netlist.declare(ctrl.counter)?;
            netlist.declare(ctrl.value)?;
            netlist.declare(ctrl.phase)?;
            for reg in state {
                netlist.declare(*reg)?;
            }
            netlist.when(ctrl.load, |netlist| {
                netlist.write(ctrl.counter, counter_zero)?;
                netlist.write(ctrl.phase, init)?;
                on_load(netlist)
            })?;
            netlist.when(ctrl.request, |netlist| {
                netlist.write(ctrl.counter, counter_zero)?;
                netlist.write(ctrl.value, value_zero)?;
                netlist.write(ctrl.phase, generate)
            })?;
            netlist.when(ctrl.in_init, |netlist| {
                netlist.when(ctrl.init_pending, |netlist| {
                    netlist.write(ctrl.counter, counter_inc)?;
                    on_advance(netlist)
                })
            })?;
            netlist.when(ctrl.in_generate, |netlist| {
                netlist.when(ctrl.generate_pending, |netlist| {
                    netlist.write(ctrl.counter, counter_inc)?;
                    on_advance(netlist)?;
                    netlist.write(ctrl.value, shifted)
                })
            })
        })
    }

    pub(crate) fn generator(&self) -> Generator {
        Generator {
            value: self.value,
            ready: self.ready,
            phase: self.phase,
            counter: self.counter,
        }
    }
}

/// Builds a quick PRNG out of a 39 bit Galois LFSR.
///
/// Setting `load` loads `seed` and then discards the first 39 bits. Setting
/// `request` then produces a `w` bit random value one bit per cycle, with the
/// newest bit in the least significant position. `ready` is set once the
/// seed has been mixed in or the value has been produced.
///
/// This has good statistical properties and is useful as a test pattern
/// generator, but it is not cryptographically strong. If `seed` is `None`, a
/// time varying seed is baked in.
pub fn prng(
    netlist: &mut Netlist,
    w: usize,
    request: Wire,
    load: Wire,
    seed: Option<Wire>,
) -> Result<Generator, Error> {
    check_control(request, load)?;
    let nzbw = value_bw(w)?;
    let seed = match seed {
        Some(seed) => seed,
        None => {
            let mut value = Awi::zero(bw(PRNG_LFSR_BW));
            StarRng::from_time().next_bits(&mut value);
            if value.is_zero() {
                value.set(0, true).unwrap();
            }
            netlist.literal(&value)
        }
    };

    let shift = netlist.wire(bw(1));
    let lfsr = galois_lfsr(netlist, PRNG_LFSR_BW, shift, load, seed)?;
    let ctrl = Controller::new(netlist, nzbw, PRNG_INIT_CYCLES, request, load)?;
    let bit = netlist.bit(lfsr.wire(), 0)?;
    ctrl.drive(netlist, &[], |_| Ok(()), |_| Ok(()), bit)?;
    let advancing = ctrl.advancing(netlist)?;
    netlist.drive(shift, advancing)?;
    Ok(ctrl.generator())
}
