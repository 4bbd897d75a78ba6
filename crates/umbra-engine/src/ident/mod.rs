//! Identifier Generator
//!
//! Produces opaque strings that never repeat within a process:
//!
//! ```text
//! <prefix>:<seg>/<seg>/.../<seg>:<counter>
//! ```
//!
//! - `prefix`: 7 random symbols plus a literal `0`, chosen once per generator
//! - 8 random segments of 11 symbols, for cross-process uniqueness
//! - `counter`: 16 little-endian base-61 digits incremented before every
//!   identifier, for in-process uniqueness even if the random source degrades
//!
//! Symbols come from a 61-character alphabet starting at `'A'`.

mod random;

pub use random::{RandomSource, SystemRandom};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::defaults::{
    ALPHABET_SIZE, ALPHABET_START, COUNTER_DIGITS, PREFIX_RANDOM_LEN, PREFIX_TERMINATOR,
    RANDOM_SEGMENT_COUNT, RANDOM_SEGMENT_LEN, RESERVED_SLOT_PREFIX,
};

static GENERATOR: Lazy<Mutex<IdentifierGenerator>> =
    Lazy::new(|| Mutex::new(IdentifierGenerator::new()));

static RESERVED_SLOT: Lazy<String> =
    Lazy::new(|| format!("{}{}", RESERVED_SLOT_PREFIX, new_identifier()));

/// Next identifier from the process-wide generator
pub fn new_identifier() -> String {
    GENERATOR.lock().next_identifier()
}

/// The process-wide attribute name under which shadow stores live
///
/// Generated on first use and constant for the rest of the process.
pub fn reserved_slot_name() -> &'static str {
    RESERVED_SLOT.as_str()
}

/// Counter-backed unique identifier generator
pub struct IdentifierGenerator {
    prefix: String,
    counter: [u8; COUNTER_DIGITS],
    random: Box<dyn RandomSource>,
}

impl IdentifierGenerator {
    /// Generator backed by [`SystemRandom`]
    pub fn new() -> Self {
        Self::with_source(Box::new(SystemRandom::new()))
    }

    /// Generator backed by any random source
    pub fn with_source(mut random: Box<dyn RandomSource>) -> Self {
        let mut prefix = random_symbols(random.as_mut(), PREFIX_RANDOM_LEN);
        prefix.push(PREFIX_TERMINATOR);
        Self {
            prefix,
            counter: [0; COUNTER_DIGITS],
            random,
        }
    }

    /// Per-generator prefix shared by every identifier it produces
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Produce the next identifier
    pub fn next_identifier(&mut self) -> String {
        self.advance_counter();

        let capacity = self.prefix.len()
            + 2
            + RANDOM_SEGMENT_COUNT * (RANDOM_SEGMENT_LEN + 1)
            + COUNTER_DIGITS;
        let mut id = String::with_capacity(capacity);
        id.push_str(&self.prefix);
        id.push(':');
        for i in 0..RANDOM_SEGMENT_COUNT {
            if i > 0 {
                id.push('/');
            }
            id.push_str(&random_symbols(self.random.as_mut(), RANDOM_SEGMENT_LEN));
        }
        id.push(':');
        id.extend(self.counter.iter().map(|&digit| encode_symbol(digit)));
        id
    }

    fn advance_counter(&mut self) {
        for digit in self.counter.iter_mut() {
            *digit += 1;
            if *digit < ALPHABET_SIZE {
                return;
            }
            *digit = 0;
        }
        // Every digit carried out: the counter has wrapped to all zeros.
    }
}

impl Default for IdentifierGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_symbol(digit: u8) -> char {
    char::from(ALPHABET_START + digit)
}

fn random_symbols(random: &mut dyn RandomSource, len: usize) -> String {
    (0..len)
        .map(|_| {
            let digit = (random.next_unit() * f64::from(ALPHABET_SIZE)) as u8;
            encode_symbol(digit.min(ALPHABET_SIZE - 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct ConstantRandom(f64);

    impl RandomSource for ConstantRandom {
        fn next_unit(&mut self) -> f64 {
            self.0
        }
    }

    fn counter_part(id: &str) -> &str {
        id.rsplit(':').next().unwrap()
    }

    #[test]
    fn test_identifier_shape() {
        let mut generator = IdentifierGenerator::new();
        let id = generator.next_identifier();

        let parts: Vec<&str> = id.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), PREFIX_RANDOM_LEN + 1);
        assert!(parts[0].ends_with('0'));

        let segments: Vec<&str> = parts[1].split('/').collect();
        assert_eq!(segments.len(), RANDOM_SEGMENT_COUNT);
        assert!(segments.iter().all(|s| s.len() == RANDOM_SEGMENT_LEN));
        assert_eq!(parts[2].len(), COUNTER_DIGITS);
    }

    #[test]
    fn test_alphabet_bounds() {
        let mut generator = IdentifierGenerator::new();
        for _ in 0..50 {
            let id = generator.next_identifier();
            let body = &id[PREFIX_RANDOM_LEN + 1..];
            assert!(body
                .chars()
                .filter(|c| *c != ':' && *c != '/')
                .all(|c| ('A'..='}').contains(&c)));
        }
    }

    #[test]
    fn test_first_counter_value_is_one() {
        let mut generator = IdentifierGenerator::with_source(Box::new(ConstantRandom(0.0)));
        let id = generator.next_identifier();
        assert_eq!(counter_part(&id), "BAAAAAAAAAAAAAAA");
    }

    #[test]
    fn test_counter_carries() {
        let mut generator = IdentifierGenerator::with_source(Box::new(ConstantRandom(0.0)));
        let last = (0..61).map(|_| generator.next_identifier()).last().unwrap();
        assert_eq!(counter_part(&last), "ABAAAAAAAAAAAAAA");
    }

    #[test]
    fn test_counter_wraps_to_zero() {
        let mut generator = IdentifierGenerator::with_source(Box::new(ConstantRandom(0.0)));
        generator.counter = [ALPHABET_SIZE - 1; COUNTER_DIGITS];
        let id = generator.next_identifier();
        assert_eq!(counter_part(&id), "AAAAAAAAAAAAAAAA");
    }

    #[test]
    fn test_unique_with_constant_random_source() {
        let mut generator = IdentifierGenerator::with_source(Box::new(ConstantRandom(0.5)));
        let ids: HashSet<String> = (0..10_000).map(|_| generator.next_identifier()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_prefix_shared_by_generator() {
        let mut generator = IdentifierGenerator::new();
        let prefix = generator.prefix().to_string();
        assert!(generator.next_identifier().starts_with(&prefix));
        assert!(generator.next_identifier().starts_with(&prefix));
    }

    #[test]
    fn test_global_identifiers_unique() {
        let a = new_identifier();
        let b = new_identifier();
        assert_ne!(a, b);
    }

    #[test]
    fn test_reserved_slot_name_stable() {
        let name = reserved_slot_name();
        assert!(name.starts_with(RESERVED_SLOT_PREFIX));
        assert_eq!(name, reserved_slot_name());
    }
}
