use condrtl::{
    awi::*,
    generators::{STREAM_INIT_CYCLES, STREAM_SEED_BW},
    stream_generator, Generator, Netlist, Simulation, Wire,
};
use testcrate::{init_logger, pulse, steps_until, TriviumModel};

const KEY: u128 = 0x0123_4567_89ab_cdef_fedc;
const IV: u128 = 0x1111_2222_3333_4444_5555;

fn seed_awi(key: u128, iv: u128) -> Awi {
    let mut seed = Awi::zero(bw(STREAM_SEED_BW));
    seed.field(0, &Awi::from_u128(key), 0, 80).unwrap();
    seed.field(80, &Awi::from_u128(iv), 0, 80).unwrap();
    seed
}

fn build(w: usize) -> (Netlist, Wire, Wire, Wire, Generator) {
    let mut netlist = Netlist::new();
    let request = netlist.input("request", bw(1));
    let load = netlist.input("load", bw(1));
    let seed = netlist.input("seed", bw(STREAM_SEED_BW));
    let rand = stream_generator(&mut netlist, w, request, load, Some(seed)).unwrap();
    (netlist, request, load, seed, rand)
}

#[test]
fn stream_timing_and_output() {
    init_logger();
    let (netlist, request, load, seed, rand) = build(16);
    assert_eq!(rand.counter.bw(), 11);
    let mut sim = Simulation::new(&netlist);
    sim.set(seed, &seed_awi(KEY, IV)).unwrap();
    sim.set_u64(request, 0).unwrap();
    pulse(&mut sim, load).unwrap();
    assert_eq!(
        steps_until(&mut sim, rand.ready, 2000).unwrap(),
        STREAM_INIT_CYCLES as u64
    );

    let mut model = TriviumModel::new(KEY, IV);
    for _ in 0..STREAM_INIT_CYCLES {
        model.step();
    }
    for _ in 0..3 {
        pulse(&mut sim, request).unwrap();
        assert_eq!(steps_until(&mut sim, rand.ready, 2000).unwrap(), 16);
        let mut expected = 0u64;
        for _ in 0..16 {
            expected = (expected << 1) | (model.step() as u64);
        }
        assert_eq!(sim.value(rand.value.wire()).unwrap().to_u64(), expected);
    }
}

#[test]
fn init_duration_is_independent_of_width() {
    for w in [1, 8, 1200] {
        let (netlist, request, load, seed, rand) = build(w);
        let mut sim = Simulation::new(&netlist);
        sim.set(seed, &seed_awi(1, 2)).unwrap();
        sim.set_u64(request, 0).unwrap();
        pulse(&mut sim, load).unwrap();
        assert_eq!(steps_until(&mut sim, rand.ready, 2000).unwrap(), 1152);
        pulse(&mut sim, request).unwrap();
        assert_eq!(steps_until(&mut sim, rand.ready, 2000).unwrap(), w as u64);
    }
}

#[test]
fn self_seeded() {
    let mut netlist = Netlist::new();
    let request = netlist.input("request", bw(1));
    let load = netlist.input("load", bw(1));
    let rand = stream_generator(&mut netlist, 32, request, load, None).unwrap();
    let mut sim = Simulation::new(&netlist);
    sim.set_u64(request, 0).unwrap();
    pulse(&mut sim, load).unwrap();
    assert_eq!(steps_until(&mut sim, rand.ready, 2000).unwrap(), 1152);
    pulse(&mut sim, request).unwrap();
    assert_eq!(steps_until(&mut sim, rand.ready, 2000).unwrap(), 32);
}
