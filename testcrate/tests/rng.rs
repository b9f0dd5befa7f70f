use std::num::NonZeroUsize;

use condrtl::{
    awi::*,
    misc::{fill_bits, StarRng},
};
use rand_xoshiro::{
    rand_core::{RngCore, SeedableRng},
    Xoshiro128StarStar,
};

/// Fills `bits` using randomly chosen chunk sizes
fn fill_chunked(metarng: &mut Xoshiro128StarStar, rng: &mut StarRng, bits: &mut Bits) {
    let mut used = 0;
    while used < bits.bw() {
        let remaining = bits.bw() - used;
        let w = ((metarng.next_u32() % 100) as usize + 1).min(remaining);
        let mut tmp = Awi::zero(NonZeroUsize::new(w).unwrap());
        if w == 1 {
            tmp.set(0, rng.next_bool()).unwrap();
        } else {
            rng.next_bits(&mut tmp);
        }
        bits.field(used, &tmp, 0, w).unwrap();
        used += w;
    }
}

#[test]
fn star_rng_is_bitwise_buffered() {
    const N: usize = 1 << 12;
    let mut metarng = Xoshiro128StarStar::seed_from_u64(1);
    let mut rng0 = StarRng::new(0);
    let mut rng1 = StarRng::new(0);
    let mut bits0 = Awi::zero(bw(N));
    let mut bits1 = Awi::zero(bw(N));
    // the chunking differs between the two fills, but the bit stream does not
    fill_chunked(&mut metarng, &mut rng0, &mut bits0);
    fill_chunked(&mut metarng, &mut rng1, &mut bits1);
    assert_eq!(bits0, bits1);
    assert!(!bits0.is_zero());

    let mut rng0 = StarRng::new(7);
    let mut rng1 = StarRng::new(7);
    let x = rng0.next_u64();
    let mut y = 0u64;
    for i in 0..64 {
        y |= u64::from(rng1.next_bool()) << i;
    }
    assert_eq!(x, y);
    let x = rng0.next_u32();
    let mut y = 0u32;
    for i in 0..32 {
        y |= u32::from(rng1.next_bool()) << i;
    }
    assert_eq!(x, y);
    // mixed widths stay aligned across buffer refills
    let mut z = Awi::zero(bw(40));
    rng1.next_bits(&mut z);
    let mut w = Awi::zero(bw(40));
    w.field(0, &Awi::from_u32(rng0.next_u32()), 0, 32).unwrap();
    let mut hi = Awi::zero(bw(8));
    rng0.next_bits(&mut hi);
    w.field(32, &hi, 0, 8).unwrap();
    assert_eq!(z, w);
    assert_ne!(StarRng::new(0).next_u64(), StarRng::new(1).next_u64());
}

#[test]
fn fill_bits_chunks() {
    let mut rng0 = Xoshiro128StarStar::seed_from_u64(3);
    let mut rng1 = Xoshiro128StarStar::seed_from_u64(3);
    let mut bits = Awi::zero(bw(150));
    fill_bits(&mut rng0, &mut bits);
    let a = rng1.next_u64();
    let b = rng1.next_u64();
    let c = rng1.next_u64();
    let mut expected = Awi::zero(bw(150));
    expected.field(0, &Awi::from_u64(a), 0, 64).unwrap();
    expected.field(64, &Awi::from_u64(b), 0, 64).unwrap();
    expected.field(128, &Awi::from_u64(c), 0, 22).unwrap();
    assert_eq!(bits, expected);

    // works through a trait object
    let rng: &mut dyn RngCore = &mut rng0;
    let mut bits = Awi::zero(bw(3));
    fill_bits(rng, &mut bits);
}
