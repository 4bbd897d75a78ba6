//! Entropy sources for identifier generation

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use tracing::warn;

/// Source of uniformly distributed numbers in `[0, 1)`
pub trait RandomSource: Send {
    /// Next number in `[0, 1)`
    fn next_unit(&mut self) -> f64;
}

enum Entropy {
    Secure(Box<dyn RngCore + Send>),
    Weak(StdRng),
}

/// OS entropy with a permanent fallback to a clock-seeded PRNG
///
/// Bytes are drawn four at a time. The secure source is probed once at
/// construction; if the probe or any later refill fails, the source switches
/// to the weak generator for the rest of its life.
pub struct SystemRandom {
    entropy: Entropy,
    buffer: [u8; 4],
    index: usize,
}

impl SystemRandom {
    /// Probe OS entropy and fall back if it is unavailable
    pub fn new() -> Self {
        Self::with_secure(OsRng)
    }

    /// Probe `rng` as the secure source and fall back if it fails
    pub fn with_secure(mut rng: impl RngCore + Send + 'static) -> Self {
        let mut probe = [0u8; 4];
        match rng.try_fill_bytes(&mut probe) {
            Ok(()) => Self {
                entropy: Entropy::Secure(Box::new(rng)),
                buffer: [0; 4],
                index: 4,
            },
            Err(err) => {
                warn!(error = %err, "secure random source unavailable, using weak fallback");
                Self::weak()
            }
        }
    }

    /// Clock-seeded PRNG only
    pub fn weak() -> Self {
        Self {
            entropy: Entropy::Weak(StdRng::seed_from_u64(clock_seed())),
            buffer: [0; 4],
            index: 4,
        }
    }

    /// Whether bytes still come from the secure source
    pub fn is_secure(&self) -> bool {
        matches!(self.entropy, Entropy::Secure(_))
    }

    fn refill(&mut self) {
        if let Entropy::Secure(rng) = &mut self.entropy {
            match rng.try_fill_bytes(&mut self.buffer) {
                Ok(()) => {
                    self.index = 0;
                    return;
                }
                Err(err) => {
                    warn!(error = %err, "secure random source failed, using weak fallback");
                    self.entropy = Entropy::Weak(StdRng::seed_from_u64(clock_seed()));
                }
            }
        }
        if let Entropy::Weak(rng) = &mut self.entropy {
            rng.fill_bytes(&mut self.buffer);
        }
        self.index = 0;
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn next_unit(&mut self) -> f64 {
        if self.index >= self.buffer.len() {
            self.refill();
        }
        let byte = self.buffer[self.index];
        self.index += 1;
        f64::from(byte) / 256.0
    }
}

fn clock_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED);
    nanos ^ (u64::from(std::process::id()) << 32)
}
