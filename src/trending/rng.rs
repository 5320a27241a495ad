/// Multiplier of the linear congruential step
const MULTIPLIER: i64 = 9301;
/// Increment of the linear congruential step
const INCREMENT: i64 = 49297;
/// Modulus of the linear congruential step, also the output divisor
const MODULUS: i64 = 233280;

/// Deterministic generator seeded from a string, usually an 8-digit date like `20240115`.
///
/// The state is pure integer arithmetic, so the same seed yields the same sequence on every
/// platform and in every process.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: i64,
}

impl SeededRng {
    /// Build a generator whose state is the 32-bit string hash of `seed`
    pub fn new(seed: &str) -> Self {
        Self {
            state: i64::from(seed_hash(seed)),
        }
    }

    /// Advance the state and return a float in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * MULTIPLIER + INCREMENT).rem_euclid(MODULUS);
        self.state as f64 / MODULUS as f64
    }
}

impl Iterator for SeededRng {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_f64())
    }
}

/// `hash * 31 + code_unit` over the UTF-16 code units of `seed`, wrapping at 32 bits.
pub fn seed_hash(seed: &str) -> i32 {
    seed.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Shorthand for [`SeededRng::new`]
pub fn make_generator(seed: &str) -> SeededRng {
    SeededRng::new(seed)
}
