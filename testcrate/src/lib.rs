use condrtl::{lfsr_taps, Error, Simulation, Wire};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Sets `signal` for one cycle
pub fn pulse(sim: &mut Simulation, signal: Wire) -> Result<(), Error> {
    sim.set_u64(signal, 1)?;
    sim.step()?;
    sim.set_u64(signal, 0)
}

/// Steps until `ready` is set and returns the number of steps taken
pub fn steps_until(sim: &mut Simulation, ready: Wire, limit: u64) -> Result<u64, Error> {
    let mut steps = 0;
    while !sim.is_set(ready)? {
        if steps >= limit {
            return Err(Error::OtherString(format!(
                "`ready` was not set after {limit} steps"
            )))
        }
        sim.step()?;
        steps += 1;
    }
    Ok(steps)
}

/// Software model of one Galois LFSR step, for `w <= 64`
pub fn galois_step(state: u64, w: usize) -> u64 {
    let taps = lfsr_taps(w).unwrap();
    let b0 = state & 1;
    let mut res = b0 << (w - 1);
    for i in 1..w {
        let mut bit = (state >> i) & 1;
        if taps.contains(&i) {
            bit ^= b0;
        }
        res |= bit << (i - 1);
    }
    res
}

/// Software model of one Fibonacci LFSR step, for `w <= 64`
pub fn fibonacci_step(state: u64, w: usize) -> u64 {
    let taps = lfsr_taps(w).unwrap();
    let mut feedback = 0;
    for tap in taps {
        feedback ^= (state >> (w - tap)) & 1;
    }
    (feedback << (w - 1)) | (state >> 1)
}

/// Software model of the stream generator state
#[derive(Debug, Clone)]
pub struct TriviumModel {
    a: Vec<bool>,
    b: Vec<bool>,
    c: Vec<bool>,
}

fn shift_in(x: &mut Vec<bool>, bit: bool) {
    x.remove(0);
    x.push(bit);
}

impl TriviumModel {
    /// `key` and `iv` are 80 bits
    pub fn new(key: u128, iv: u128) -> Self {
        let mut a = vec![false; 93];
        let mut b = vec![false; 84];
        let mut c = vec![false; 111];
        for i in 0..80 {
            a[13 + i] = ((key >> i) & 1) != 0;
            b[4 + i] = ((iv >> i) & 1) != 0;
        }
        c[108] = true;
        c[109] = true;
        c[110] = true;
        Self { a, b, c }
    }

    /// Returns the output bit of the current state and advances
    pub fn step(&mut self) -> bool {
        let (a, b, c) = (&self.a, &self.b, &self.c);
        let ff_a = a[0] ^ (a[1] & a[2]) ^ a[27];
        let ff_b = b[0] ^ (b[1] & b[2]) ^ b[15];
        let ff_c = c[0] ^ (c[1] & c[2]) ^ c[45];
        let fb_a = ff_c ^ a[24];
        let fb_b = ff_a ^ b[6];
        let fb_c = ff_b ^ c[24];
        shift_in(&mut self.a, fb_a);
        shift_in(&mut self.b, fb_b);
        shift_in(&mut self.c, fb_c);
        ff_a ^ ff_b ^ ff_c
    }
}
