//! 32-bit Mersenne Twister (MT19937) and boost-compatible range sampling.
//!
//! Legacy subsidies are drawn from this exact generator; the output
//! sequence for a seed is part of consensus.

use rand::{Error, RngCore, SeedableRng};

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

/// Default seed of `std::mt19937` and `boost::mt19937`.
pub const DEFAULT_SEED: u32 = 5489;

/// MT19937 generator state.
#[derive(Clone)]
pub struct Mt19937 {
    state: [u32; N],
    index: usize,
}

impl Mt19937 {
    pub fn new(seed: u32) -> Self {
        let mut state = [0u32; N];
        state[0] = seed;
        for i in 1..N {
            let prev = state[i - 1];
            state[i] = 1_812_433_253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        Mt19937 { state, index: N }
    }

    fn twist(&mut self) {
        for k in 0..N {
            let y = (self.state[k] & UPPER_MASK) | (self.state[(k + 1) % N] & LOWER_MASK);
            let mut next = self.state[(k + M) % N] ^ (y >> 1);
            if y & 1 != 0 {
                next ^= MATRIX_A;
            }
            self.state[k] = next;
        }
        self.index = 0;
    }

    fn next_word(&mut self) -> u32 {
        if self.index >= N {
            self.twist();
        }
        let mut y = self.state[self.index];
        self.index += 1;

        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^ (y >> 18)
    }
}

impl Default for Mt19937 {
    fn default() -> Self {
        Mt19937::new(DEFAULT_SEED)
    }
}

impl core::fmt::Debug for Mt19937 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Mt19937").field("index", &self.index).finish_non_exhaustive()
    }
}

impl RngCore for Mt19937 {
    fn next_u32(&mut self) -> u32 {
        self.next_word()
    }

    fn next_u64(&mut self) -> u64 {
        let low = self.next_word() as u64;
        let high = self.next_word() as u64;
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = self.next_word().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mt19937 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Mt19937::new(u32::from_le_bytes(seed))
    }

    /// Truncates to the low 32 bits, like seeding the C++ engine with an
    /// unsigned int.
    fn seed_from_u64(state: u64) -> Self {
        Mt19937::new(state as u32)
    }
}

/// Uniform integer in `[min, max]` using boost's bucket rejection.
///
/// Each draw divides a 32-bit output by the bucket size and retries when
/// the quotient falls past the range. `max < min` yields `min`.
pub fn uniform_int<R: RngCore>(rng: &mut R, min: u32, max: u32) -> u32 {
    if max <= min {
        return min;
    }
    let range = (max - min) as u64;
    let brange = u32::MAX as u64;
    if range == brange {
        return rng.next_u32().wrapping_add(min);
    }

    let mut bucket_size = brange / (range + 1);
    if brange % (range + 1) == range {
        bucket_size += 1;
    }

    loop {
        let result = rng.next_u32() as u64 / bucket_size;
        if result <= range {
            return result as u32 + min;
        }
    }
}

/// One draw in `[1, range]` from a generator freshly seeded with `seed`.
pub fn generate_mt_random(seed: u32, range: u32) -> u32 {
    let mut rng = Mt19937::new(seed);
    uniform_int(&mut rng, 1, range)
}
