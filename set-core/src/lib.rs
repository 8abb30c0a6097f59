//! Shared number primitives for prime-set exploration.
//!
//! `arith` adapts `num_bigint::BigInt` to the operations the set combinator
//! needs (truncating division, decimal I/O, Mersenne construction) and
//! `primality` answers probable-primality queries reproducibly.

pub mod arith;
pub mod primality;

pub use arith::{checked_div_rem, from_literals, mersenne, parse_decimal, to_decimal_string, ParseError};
pub use num_bigint::BigInt;
pub use primality::{is_probable_prime, is_probably_prime, lucas_lehmer, LucasLehmer, MILLER_RABIN_ROUNDS};
