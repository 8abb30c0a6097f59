//! Probable-prime oracle and the Lucas-Lehmer test for Mersenne numbers.
//!
//! [`is_probable_prime`] is Miller-Rabin with [`MILLER_RABIN_ROUNDS`] rounds.
//! Each round a composite survives with probability at most 1/4, so a
//! composite is reported prime with probability below 4^-25 per call. A
//! "true" answer is therefore a strong indication, not a proof.
//!
//! Witnesses come from an RNG seeded by the candidate's own digits, so the same
//! input always gets the same witnesses and the same answer, on any thread.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Miller-Rabin rounds used by [`is_probable_prime`].
pub const MILLER_RABIN_ROUNDS: u32 = 25;

/// Mixed into every witness seed.
const WITNESS_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Lucas-Lehmer iterations between progress log lines.
const LL_PROGRESS_INTERVAL: u64 = 1000;

const SMALL_PRIMES: &[u32] = &[
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Probable-primality of a signed value. Everything `<= 1` is composite.
pub fn is_probable_prime(n: &BigInt) -> bool {
    match n.to_biguint() {
        Some(magnitude) => is_probably_prime(&magnitude, MILLER_RABIN_ROUNDS),
        None => false,
    }
}

/// Miller-Rabin probabilistic primality test with deterministic witnesses.
pub fn is_probably_prime(n: &BigUint, rounds: u32) -> bool {
    let one = BigUint::one();

    if *n <= one {
        return false;
    }

    for &p in SMALL_PRIMES {
        if *n == BigUint::from(p) {
            return true;
        }
        if (n % p).is_zero() {
            return false;
        }
    }

    // Write n-1 as 2^r * d
    let n_minus_1 = n - &one;
    let mut d = n_minus_1.clone();
    let mut r: u32 = 0;
    while d.is_even() {
        d >>= 1u32;
        r += 1;
    }

    let two = BigUint::from(2u32);
    let n_minus_2 = &n_minus_1 - &one;
    let mut rng = witness_rng(n);

    'witness: for _ in 0..rounds {
        let a = random_witness(n, &two, &n_minus_2, &mut rng);
        let mut x = a.modpow(&d, n);

        if x == one || x == n_minus_1 {
            continue 'witness;
        }

        for _ in 0..r - 1 {
            x = &x * &x % n;
            if x == n_minus_1 {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// RNG whose seed depends only on `n`.
fn witness_rng(n: &BigUint) -> StdRng {
    let fingerprint = n
        .iter_u64_digits()
        .fold(WITNESS_SEED, |acc, digit| acc.rotate_left(13) ^ digit);
    StdRng::seed_from_u64(fingerprint)
}

/// Random a in [low, high].
fn random_witness(n: &BigUint, low: &BigUint, high: &BigUint, rng: &mut StdRng) -> BigUint {
    let num_bytes = n.to_bytes_be().len();
    loop {
        let mut random_bytes = vec![0u8; num_bytes];
        rng.fill(&mut random_bytes[..]);
        let a = BigUint::from_bytes_be(&random_bytes) % n;
        if a >= *low && a <= *high {
            return a;
        }
    }
}

/// Lucas-Lehmer test: is M_p = 2^p - 1 prime?
///
/// Exact (no error probability). A composite exponent always gives a
/// composite M_p, so those are rejected before iterating.
pub fn lucas_lehmer(p: u64) -> bool {
    if p == 2 {
        return true;
    }
    if !is_probably_prime(&BigUint::from(p), MILLER_RABIN_ROUNDS) {
        return false;
    }

    let mut run = match LucasLehmer::new(p) {
        Some(run) => run,
        None => return false,
    };
    while !run.is_finished() {
        run.advance(LL_PROGRESS_INTERVAL);
        log::debug!(
            "lucas-lehmer p={}: iteration {}/{}",
            p,
            run.iteration(),
            run.total_iterations()
        );
    }

    run.verdict() == Some(true)
}

/// A Lucas-Lehmer computation that can be advanced in steps, captured and
/// resumed.
///
/// `iteration` counts completed squarings; `residue` is s_iteration mod M_p
/// with s_0 = 4. M_p is prime iff the residue is zero after p - 2 squarings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LucasLehmer {
    p: u64,
    modulus: BigUint,
    residue: BigUint,
    iteration: u64,
}

impl LucasLehmer {
    /// Fresh run at s_0 = 4. `None` for p < 3, where there is nothing to iterate.
    pub fn new(p: u64) -> Option<Self> {
        Self::resume(p, 0, BigUint::from(4u32))
    }

    /// Continue a run from `residue` after `iteration` squarings.
    ///
    /// `None` if p < 3, `iteration` exceeds p - 2, or `residue` is not
    /// reduced mod M_p.
    pub fn resume(p: u64, iteration: u64, residue: BigUint) -> Option<Self> {
        if p < 3 || iteration > p - 2 {
            return None;
        }
        let modulus = (BigUint::one() << p) - 1u32;
        if residue >= modulus {
            return None;
        }
        Some(Self {
            p,
            modulus,
            residue,
            iteration,
        })
    }

    pub fn p(&self) -> u64 {
        self.p
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn residue(&self) -> &BigUint {
        &self.residue
    }

    pub fn total_iterations(&self) -> u64 {
        self.p - 2
    }

    pub fn is_finished(&self) -> bool {
        self.iteration >= self.total_iterations()
    }

    /// Run at most `steps` more squarings. Returns how many were performed.
    pub fn advance(&mut self, steps: u64) -> u64 {
        let todo = steps.min(self.total_iterations() - self.iteration);
        for _ in 0..todo {
            // s^2 - 2 without leaving the naturals: s < M_p, so s^2 + M_p - 2 >= 0
            self.residue = (&self.residue * &self.residue + &self.modulus - 2u32) % &self.modulus;
        }
        self.iteration += todo;
        todo
    }

    /// `Some(is_prime)` once every squaring is done.
    pub fn verdict(&self) -> Option<bool> {
        self.is_finished().then(|| self.residue.is_zero())
    }
}
