//! Seeded named-stream random generator.
//!
//! Every random draw in the simulation comes from a stream addressed by a
//! key of the form `"{seed}|{purpose}|{context…}"`. The key is hashed with
//! 32-bit FNV-1a into the state of a linear-congruential generator, which
//! makes draws independent of iteration order: a swimmer's maneuver stream
//! or a ping's speckle stream yields the same sequence no matter when it is
//! opened. There is no ambient randomness anywhere in the core.
//!
//! The generator also implements [`rand::RngCore`], so spawn factories and
//! the PSO can use the ordinary `rand::Rng` API on top of a named stream.

use rand::RngCore;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

const LCG_MUL: u32 = 1_664_525;
const LCG_ADD: u32 = 1_013_904_223;

/// 32-bit FNV-1a hash of a stream key.
pub fn fnv1a_32(key: &str) -> u32 {
    let mut hash = FNV_OFFSET;
    for byte in key.as_bytes() {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// A named deterministic random stream.
#[derive(Debug, Clone)]
pub struct StreamRng {
    key: String,
    state: u32,
}

impl StreamRng {
    /// Open the stream addressed by `key`.
    pub fn from_key(key: impl Into<String>) -> Self {
        let key = key.into();
        let state = fnv1a_32(&key);
        Self { key, state }
    }

    /// Open the stream `"{seed}|{part}|{part}…"`.
    pub fn stream(seed: u32, parts: &[&str]) -> Self {
        let mut key = seed.to_string();
        for part in parts {
            key.push('|');
            key.push_str(part);
        }
        Self::from_key(key)
    }

    /// Derive a child stream by appending `label` to this stream's key.
    pub fn fork(&self, label: &str) -> Self {
        Self::from_key(format!("{}|{}", self.key, label))
    }

    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(LCG_MUL).wrapping_add(LCG_ADD);
        self.state
    }

    /// Uniform draw in [0, 1): `state / 2^32`.
    pub fn next_f64(&mut self) -> f64 {
        self.step() as f64 / 4_294_967_296.0
    }

    /// Uniform draw in [lo, hi).
    pub fn next_range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Bernoulli draw with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Gaussian draw via Box–Muller (two uniforms per sample).
    pub fn gaussian(&mut self, mean: f64, std: f64) -> f64 {
        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        let mag = (-2.0 * u1.ln()).sqrt();
        mean + std * mag * (std::f64::consts::TAU * u2).cos()
    }
}

impl RngCore for StreamRng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.step() as u64;
        let lo = self.step() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = self.step().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
