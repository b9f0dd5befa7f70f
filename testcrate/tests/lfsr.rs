use condrtl::{
    awi::*,
    fibonacci_lfsr, galois_lfsr,
    generators::{lfsr_taps, LFSR_TAP_TABLE},
    Error, Netlist, Register, Simulation, Wire,
};
use testcrate::{fibonacci_step, galois_step, init_logger};

struct Harness {
    netlist: Netlist,
    shift: Wire,
    load: Wire,
    seed: Wire,
}

impl Harness {
    fn new(w: usize) -> Self {
        let mut netlist = Netlist::new();
        let shift = netlist.input("shift", bw(1));
        let load = netlist.input("load", bw(1));
        let seed = netlist.input("seed", bw(w));
        Self {
            netlist,
            shift,
            load,
            seed,
        }
    }
}

/// Loads `seed` and then shifts every cycle, returning the state before each
/// shift
fn run(h: &Harness, lfsr: Register, seed: u64, n: usize) -> Vec<u64> {
    let mut sim = Simulation::new(&h.netlist);
    sim.set_u64(h.seed, seed).unwrap();
    sim.set_u64(h.shift, 0).unwrap();
    sim.set_u64(h.load, 1).unwrap();
    sim.step().unwrap();
    sim.set_u64(h.load, 0).unwrap();
    sim.set_u64(h.shift, 1).unwrap();
    let mut states = vec![];
    for _ in 0..n {
        states.push(sim.value(lfsr.wire()).unwrap().to_u64());
        sim.step().unwrap();
    }
    states
}

#[test]
fn tap_table() {
    let mut prev = 0;
    for (w, taps) in LFSR_TAP_TABLE {
        assert!(*w > prev);
        prev = *w;
        assert_eq!(taps[0], *w);
        assert_eq!(lfsr_taps(*w).unwrap(), *taps);
    }
    assert_eq!(lfsr_taps(39).unwrap(), &[39, 35]);
    assert_eq!(lfsr_taps(4096).unwrap(), &[4096, 4095, 4081, 4069]);
    for w in [0, 1, 33, 38, 40, 65, 4097] {
        assert_eq!(lfsr_taps(w), Err(Error::UnsupportedWidth(w)));
    }
}

#[test]
fn unsupported_widths_construct_nothing() {
    let mut netlist = Netlist::new();
    let shift = netlist.input("shift", bw(1));
    let load = netlist.input("load", bw(1));
    let seed = netlist.input("seed", bw(64));
    let len = netlist.nodes.len();
    for w in [0, 1, 33, 100] {
        assert_eq!(
            galois_lfsr(&mut netlist, w, shift, load, seed),
            Err(Error::UnsupportedWidth(w))
        );
        assert_eq!(
            fibonacci_lfsr(&mut netlist, w, shift, load, seed),
            Err(Error::UnsupportedWidth(w))
        );
    }
    assert_eq!(netlist.nodes.len(), len);
    assert!(netlist.assertions.is_empty());
}

#[test]
fn constant_zero_seed() {
    let mut netlist = Netlist::new();
    let shift = netlist.input("shift", bw(1));
    let load = netlist.input("load", bw(1));
    let zero = netlist.lit_u64(0, bw(8));
    assert_eq!(
        galois_lfsr(&mut netlist, 8, shift, load, zero),
        Err(Error::ZeroSeed)
    );
    // zero after truncation
    let truncated_zero = netlist.lit_u64(0x100, bw(16));
    assert_eq!(
        fibonacci_lfsr(&mut netlist, 8, shift, load, truncated_zero),
        Err(Error::ZeroSeed)
    );
    let nonzero = netlist.lit_u64(0x101, bw(16));
    let lfsr = fibonacci_lfsr(&mut netlist, 8, shift, load, nonzero).unwrap();
    assert_eq!(lfsr.bw(), 8);
}

#[test]
fn live_zero_seed_fails_in_simulation() {
    let mut h = Harness::new(8);
    galois_lfsr(&mut h.netlist, 8, h.shift, h.load, h.seed).unwrap();
    let mut sim = Simulation::new(&h.netlist);
    sim.set_u64(h.shift, 0).unwrap();
    sim.set_u64(h.load, 1).unwrap();
    sim.set_u64(h.seed, 3).unwrap();
    sim.step().unwrap();
    sim.set_u64(h.seed, 0).unwrap();
    assert!(matches!(
        sim.step(),
        Err(Error::AssertionFailure { cycle: 1, .. })
    ));
}

#[test]
fn load_round_trip() {
    for w in [2, 7, 16, 39, 64] {
        let mut h = Harness::new(w);
        let galois = galois_lfsr(&mut h.netlist, w, h.shift, h.load, h.seed).unwrap();
        let fibonacci = fibonacci_lfsr(&mut h.netlist, w, h.shift, h.load, h.seed).unwrap();
        let seed = 0x1234_5678_9abc_def1u64 & (u64::MAX >> (64 - w));
        let mut sim = Simulation::new(&h.netlist);
        sim.set_u64(h.seed, seed).unwrap();
        sim.set_u64(h.shift, 0).unwrap();
        sim.set_u64(h.load, 1).unwrap();
        sim.step().unwrap();
        sim.set_u64(h.load, 0).unwrap();
        for _ in 0..3 {
            // holds without a shift request
            assert_eq!(sim.value(galois.wire()).unwrap().to_u64(), seed);
            assert_eq!(sim.value(fibonacci.wire()).unwrap().to_u64(), seed);
            sim.step().unwrap();
        }
    }
}

#[test]
fn load_has_priority() {
    let mut h = Harness::new(5);
    let lfsr = galois_lfsr(&mut h.netlist, 5, h.shift, h.load, h.seed).unwrap();
    let mut sim = Simulation::new(&h.netlist);
    sim.set_u64(h.seed, 0b10110).unwrap();
    sim.set_u64(h.shift, 1).unwrap();
    sim.set_u64(h.load, 1).unwrap();
    sim.run(4).unwrap();
    assert_eq!(sim.value(lfsr.wire()).unwrap().to_u64(), 0b10110);
    sim.set_u64(h.load, 0).unwrap();
    sim.step().unwrap();
    assert_eq!(
        sim.value(lfsr.wire()).unwrap().to_u64(),
        galois_step(0b10110, 5)
    );
}

#[test]
fn software_models() {
    init_logger();
    for w in [3, 8, 16, 39] {
        let mut h = Harness::new(w);
        let galois = galois_lfsr(&mut h.netlist, w, h.shift, h.load, h.seed).unwrap();
        let mut fib_h = Harness::new(w);
        let fibonacci =
            fibonacci_lfsr(&mut fib_h.netlist, w, fib_h.shift, fib_h.load, fib_h.seed).unwrap();
        let states = run(&h, galois, 1, 100);
        let fib_states = run(&fib_h, fibonacci, 1, 100);
        let mut state = 1;
        let mut fib_state = 1;
        for i in 0..100 {
            assert_eq!(states[i], state);
            assert_eq!(fib_states[i], fib_state);
            state = galois_step(state, w);
            fib_state = fibonacci_step(fib_state, w);
        }
    }
}

#[test]
fn maximal_period() {
    for w in [2, 3, 4, 5, 6, 7, 8] {
        let period = (1usize << w) - 1;
        let mut h = Harness::new(w);
        let galois = galois_lfsr(&mut h.netlist, w, h.shift, h.load, h.seed).unwrap();
        let fibonacci = fibonacci_lfsr(&mut h.netlist, w, h.shift, h.load, h.seed).unwrap();
        for lfsr in [galois, fibonacci] {
            let states = run(&h, lfsr, 1, period + 1);
            let mut sorted = states[..period].to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), period);
            assert!(!sorted.contains(&0));
            assert_eq!(states[period], states[0]);
        }
    }
}

#[test]
fn same_stream_with_offset() {
    for w in [5, 8] {
        let period = (1usize << w) - 1;
        let mut h = Harness::new(w);
        let galois = galois_lfsr(&mut h.netlist, w, h.shift, h.load, h.seed).unwrap();
        let fibonacci = fibonacci_lfsr(&mut h.netlist, w, h.shift, h.load, h.seed).unwrap();
        for seed in [1, 0b10011] {
            let galois_bits: Vec<u64> = run(&h, galois, seed, 2 * period)
                .iter()
                .map(|s| s & 1)
                .collect();
            let fibonacci_bits: Vec<u64> = run(&h, fibonacci, seed, period)
                .iter()
                .map(|s| s & 1)
                .collect();
            let offset = (0..period)
                .find(|o| galois_bits[*o..(*o + period)] == fibonacci_bits[..])
                .unwrap();
            // the offset is a fixed property of the seed
            let again: Vec<u64> = run(&h, galois, seed, 2 * period)
                .iter()
                .map(|s| s & 1)
                .collect();
            assert_eq!(again[offset..(offset + period)], fibonacci_bits[..]);
        }
    }
}
