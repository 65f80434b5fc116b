/// Deterministic RNG based on splitmix64. Synthetic fields and points are
/// reproducible from a seed.

#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Hash of an integer lattice position, for lattice noise.
#[inline]
pub fn lattice_hash(ix: i64, iy: i64, seed: u64) -> u64 {
    let h = splitmix64(seed ^ (ix as u64).wrapping_mul(0x85EBCA6B));
    splitmix64(h ^ (iy as u64).wrapping_mul(0xC2B2AE35))
}

/// Lattice hash mapped to `[-1, 1)`.
#[inline]
pub fn lattice_value(ix: i64, iy: i64, seed: u64) -> f64 {
    (lattice_hash(ix, iy, seed) >> 11) as f64 / (1u64 << 52) as f64 - 1.0
}

pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = splitmix64(self.state);
        self.state
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    pub fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Uniform in `[lo, hi)`; `lo` when the range is empty.
    pub fn range_i64(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        lo + (self.next_u64() % (hi - lo) as u64) as i64
    }
}
