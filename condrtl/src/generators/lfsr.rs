use std::num::NonZeroUsize;

use awint::awi::*;

use super::taps::lfsr_taps;
use crate::{Error, Netlist, Register, Wire};

/// Shared validation, everything here happens before the state register is
/// created
fn prepare(
    netlist: &mut Netlist,
    w: usize,
    shift: Wire,
    load: Wire,
    seed: Wire,
) -> Result<(NonZeroUsize, &'static [usize], Wire), Error> {
    let taps = lfsr_taps(w)?;
    let nzbw = NonZeroUsize::new(w).ok_or(Error::UnsupportedWidth(w))?;
    if shift.bw() != 1 {
        return Err(Error::BitwidthMismatch(shift.bw(), 1))
    }
    if load.bw() != 1 {
        return Err(Error::BitwidthMismatch(load.bw(), 1))
    }
    let lit = netlist.literal_value(seed)?.map(|lit| Awi::from(lit));
    let seed = if let Some(lit) = lit {
        let mut resized = Awi::zero(nzbw);
        let width = lit.bw().min(w);
        resized.field(0, &lit, 0, width).unwrap();
        if resized.is_zero() {
            return Err(Error::ZeroSeed)
        }
        netlist.literal(&resized)
    } else {
        netlist.resize(seed, nzbw)?
    };
    netlist.assert_nonzero(seed, "LFSR must start in a non-zero seed state")?;
    Ok((nzbw, taps, seed))
}

/// Loads `seed` or advances the state register, with `load` taking priority
fn drive_lfsr(
    netlist: &mut Netlist,
    lfsr: Register,
    shift: Wire,
    load: Wire,
    seed: Wire,
    shifted: Wire,
) -> Result<(), Error> {
    netlist.conditional(|netlist| {
        netlist.declare(lfsr)?;
        netlist.when(load, |netlist| netlist.write(lfsr, seed))?;
        netlist.when(shift, |netlist| netlist.write(lfsr, shifted))
    })
}

/// Creates an LFSR in the Fibonacci configuration and returns its state
/// register. The whole state is returned for flexibility; the most
/// significant bit is the best bit to use.
///
/// The feedback bit is the XOR of a chain of the tapped bits and is shifted
/// in at the top, giving a period of `2^w - 1`. This has a longer critical
/// path than [galois_lfsr].
///
/// # Errors
///
/// If `w` has no tap table entry or `seed` is a constant zero. Otherwise an
/// assertion is registered that fails in simulation when the live `seed` is
/// zero.
pub fn fibonacci_lfsr(
    netlist: &mut Netlist,
    w: usize,
    shift: Wire,
    load: Wire,
    seed: Wire,
) -> Result<Register, Error> {
    let (nzbw, taps, seed) = prepare(netlist, w, shift, load, seed)?;
    let lfsr = netlist.register("lfsr", nzbw);
    let state = lfsr.wire();
    // tap numbering is reversed for Fibonacci LFSRs
    let mut feedback = netlist.bit(state, w - taps[0])?;
    for tap in &taps[1..] {
        let bit = netlist.bit(state, w - tap)?;
        feedback = netlist.xor(feedback, bit)?;
    }
    let rest = netlist.slice(state, 1, w)?;
    let shifted = netlist.concat(&[feedback, rest])?;
    drive_lfsr(netlist, lfsr, shift, load, seed, shifted)?;
    Ok(lfsr)
}

/// Creates an LFSR in the Galois configuration and returns its state
/// register. The whole state is returned for flexibility; the least
/// significant bit is the best bit to use.
///
/// The lowest bit is rotated to the top and XORed into every tapped position
/// in parallel. This produces the same bit stream as [fibonacci_lfsr] with a
/// time offset, and has a shorter critical path.
///
/// # Errors
///
/// The same as [fibonacci_lfsr]
pub fn galois_lfsr(
    netlist: &mut Netlist,
    w: usize,
    shift: Wire,
    load: Wire,
    seed: Wire,
) -> Result<Register, Error> {
    let (nzbw, taps, seed) = prepare(netlist, w, shift, load, seed)?;
    let lfsr = netlist.register("lfsr", nzbw);
    let state = lfsr.wire();
    let feedback = netlist.bit(state, 0)?;
    let mut parts = vec![feedback];
    for i in (1..w).rev() {
        let bit = netlist.bit(state, i)?;
        if taps.contains(&i) {
            parts.push(netlist.xor(feedback, bit)?);
        } else {
            parts.push(bit);
        }
    }
    let shifted = netlist.concat(&parts)?;
    drive_lfsr(netlist, lfsr, shift, load, seed, shifted)?;
    Ok(lfsr)
}
