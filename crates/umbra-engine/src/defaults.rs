//! Default constants for identifier shape and realm configuration.
//!
//! Centralizes the numbers shared by the identifier generator, the realm and
//! the options loader.

/// First code point of the identifier alphabet (`'A'`).
pub const ALPHABET_START: u8 = b'A';

/// Number of symbols in the identifier alphabet (`'A'` through `'}'`).
pub const ALPHABET_SIZE: u8 = 61;

/// Random symbols in the per-process identifier prefix.
pub const PREFIX_RANDOM_LEN: usize = 7;

/// Literal digit closing the per-process prefix.
pub const PREFIX_TERMINATOR: char = '0';

/// Random segments per identifier.
pub const RANDOM_SEGMENT_COUNT: usize = 8;

/// Symbols per random segment.
pub const RANDOM_SEGMENT_LEN: usize = 11;

/// Little-endian base-61 digits in the uniqueness counter.
pub const COUNTER_DIGITS: usize = 16;

/// Prefix of the reserved slot name.
pub const RESERVED_SLOT_PREFIX: &str = "!S:";

/// Default prefix of an opaque handle's id.
pub const DEFAULT_HANDLE_PREFIX: &str = "!Y:";

/// Hidden field under which a handle keeps its own id.
pub const HANDLE_ID_FIELD: &str = "id";

/// Whether `Realm::create_object` attaches a shadow store up front.
pub const DEFAULT_AUTO_ATTACH_ON_CREATE: bool = true;
