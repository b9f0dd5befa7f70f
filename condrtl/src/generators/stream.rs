use awint::awi::*;

use super::prng::{check_control, value_bw, Controller, Generator};
use crate::{misc::fill_bits, Error, Netlist, Register, Wire};

/// The number of cycles discarded after seeding a [stream_generator], four
/// times the 288 bits of state
pub const STREAM_INIT_CYCLES: usize = 1152;
/// The seed is an 80 bit key in the low half and an 80 bit IV in the high half
pub const STREAM_SEED_BW: usize = 160;
const KEY_BW: usize = 80;

/// One of the three coupled shift registers
#[derive(Debug, Clone, Copy)]
struct Stage {
    reg: Register,
    feedforward: Wire,
}

impl Stage {
    /// `x[0] ^ (x[1] & x[2]) ^ x[tap]`
    fn new(netlist: &mut Netlist, name: &str, w: usize, tap: usize) -> Result<Self, Error> {
        let reg = netlist.register(name, bw(w));
        let x = reg.wire();
        let x0 = netlist.bit(x, 0)?;
        let x1 = netlist.bit(x, 1)?;
        let x2 = netlist.bit(x, 2)?;
        let xt = netlist.bit(x, tap)?;
        let and = netlist.and(x1, x2)?;
        let tmp = netlist.xor(x0, and)?;
        let feedforward = netlist.xor(tmp, xt)?;
        Ok(Self { reg, feedforward })
    }

    /// The state with `prev_feedforward ^ x[tap]` shifted in at the top
    fn shifted(
        &self,
        netlist: &mut Netlist,
        prev_feedforward: Wire,
        tap: usize,
    ) -> Result<Wire, Error> {
        let x = self.reg.wire();
        let xt = netlist.bit(x, tap)?;
        let feedback = netlist.xor(prev_feedforward, xt)?;
        let rest = netlist.slice(x, 1, self.reg.bw())?;
        netlist.concat(&[feedback, rest])
    }
}

/// Builds a cryptographically strong PRNG out of the Trivium stream cipher.
///
/// This has the same interface as [crate::prng], except that `seed` is 160
/// bits (see [STREAM_SEED_BW]) and 1152 bits are discarded after seeding. If
/// `seed` is `None`, the key and IV are drawn from the operating system
/// entropy source at construction time and baked in.
pub fn stream_generator(
    netlist: &mut Netlist,
    w: usize,
    request: Wire,
    load: Wire,
    seed: Option<Wire>,
) -> Result<Generator, Error> {
    check_control(request, load)?;
    let nzbw = value_bw(w)?;
    let (key, iv) = match seed {
        Some(seed) => {
            let seed = netlist.resize(seed, bw(STREAM_SEED_BW))?;
            (
                netlist.slice(seed, 0, KEY_BW)?,
                netlist.slice(seed, KEY_BW, STREAM_SEED_BW)?,
            )
        }
        None => {
            let mut rng = rand::thread_rng();
            let mut key = Awi::zero(bw(KEY_BW));
            let mut iv = Awi::zero(bw(KEY_BW));
            fill_bits(&mut rng, &mut key);
            fill_bits(&mut rng, &mut iv);
            (netlist.literal(&key), netlist.literal(&iv))
        }
    };

    // 288 bits of internal state
    let a = Stage::new(netlist, "a", 93, 27)?;
    let b = Stage::new(netlist, "b", 84, 15)?;
    let c = Stage::new(netlist, "c", 111, 45)?;
    let a_shifted = a.shifted(netlist, c.feedforward, 24)?;
    let b_shifted = b.shifted(netlist, a.feedforward, 6)?;
    let c_shifted = c.shifted(netlist, b.feedforward, 24)?;
    let tmp = netlist.xor(a.feedforward, b.feedforward)?;
    let bit = netlist.xor(tmp, c.feedforward)?;

    let a_pad = netlist.lit_u64(0, bw(93 - KEY_BW));
    let a_load = netlist.concat(&[key, a_pad])?;
    let b_pad = netlist.lit_u64(0, bw(84 - KEY_BW));
    let b_load = netlist.concat(&[iv, b_pad])?;
    let c_top = netlist.lit_u64(0b111, bw(3));
    let c_pad = netlist.lit_u64(0, bw(108));
    let c_load = netlist.concat(&[c_top, c_pad])?;

    let ctrl = Controller::new(netlist, nzbw, STREAM_INIT_CYCLES, request, load)?;
    ctrl.drive(
        netlist,
        &[a.reg, b.reg, c.reg],
        |netlist| {
            netlist.write(a.reg, a_load)?;
            netlist.write(b.reg, b_load)?;
            netlist.write(c.reg, c_load)
        },
        |netlist| {
            netlist.write(a.reg, a_shifted)?;
            netlist.write(b.reg, b_shifted)?;
            netlist.write(c.reg, c_shifted)
        },
        bit,
    )?;
    Ok(ctrl.generator())
}
