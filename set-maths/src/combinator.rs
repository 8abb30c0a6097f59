//! Pairwise combinator: elementwise arithmetic over two sets, prime filtered.
//!
//! For each index `k < limit` the pair `(x[k], y[k])` yields up to five
//! candidates (product, sum, positive difference, quotient, remainder). Only
//! probable primes survive. The index range is split into contiguous
//! sub-ranges, one per worker; each worker fills its own local bundle and the
//! partial bundles are concatenated in sub-range order afterwards, so the
//! output is identical to a sequential scan regardless of scheduling.

use std::fmt;
use std::ops::Range;

use num_bigint::BigInt;
use num_traits::Signed;
use rayon::prelude::*;
use set_core::{checked_div_rem, is_probable_prime};

use crate::error::SetError;
use crate::registry::Registry;

/// The five derived operations, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Product,
    Sum,
    Difference,
    Quotient,
    Remainder,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Product,
        Operation::Sum,
        Operation::Difference,
        Operation::Quotient,
        Operation::Remainder,
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Product => write!(f, "product"),
            Operation::Sum => write!(f, "sum"),
            Operation::Difference => write!(f, "difference"),
            Operation::Quotient => write!(f, "quotient"),
            Operation::Remainder => write!(f, "remainder"),
        }
    }
}

/// Prime survivors of one combination pass, one sequence per operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultBundle {
    pub product: Vec<BigInt>,
    pub sum: Vec<BigInt>,
    pub difference: Vec<BigInt>,
    pub quotient: Vec<BigInt>,
    pub remainder: Vec<BigInt>,
}

impl ResultBundle {
    pub fn get(&self, op: Operation) -> &[BigInt] {
        match op {
            Operation::Product => &self.product,
            Operation::Sum => &self.sum,
            Operation::Difference => &self.difference,
            Operation::Quotient => &self.quotient,
            Operation::Remainder => &self.remainder,
        }
    }

    /// Total number of survivors across all five sequences.
    pub fn total(&self) -> usize {
        Operation::ALL.iter().map(|&op| self.get(op).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Append `other` after `self`, sequence by sequence.
    pub fn append(&mut self, mut other: ResultBundle) {
        self.product.append(&mut other.product);
        self.sum.append(&mut other.sum);
        self.difference.append(&mut other.difference);
        self.quotient.append(&mut other.quotient);
        self.remainder.append(&mut other.remainder);
    }

    /// The five sequences in registration order.
    pub fn into_collections(self) -> [(Operation, Vec<BigInt>); 5] {
        [
            (Operation::Product, self.product),
            (Operation::Sum, self.sum),
            (Operation::Difference, self.difference),
            (Operation::Quotient, self.quotient),
            (Operation::Remainder, self.remainder),
        ]
    }
}

/// Worker configuration for [`combine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineConfig {
    /// Number of worker threads (and sub-ranges). Clamped to `1..=limit`.
    pub workers: usize,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

impl CombineConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }
}

/// A set registered from one bundle sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredSet {
    pub name: String,
    pub operation: Operation,
    pub len: usize,
}

/// A fixed-size worker pool for repeated combination passes.
///
/// The pool is built once and reused by every [`Combinator::combine`] call,
/// so a long auto run keeps the same threads throughout.
pub struct Combinator {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl Combinator {
    pub fn new(config: &CombineConfig) -> Result<Self, SetError> {
        let workers = config.workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| SetError::WorkerPool(e.to_string()))?;
        log::debug!("combinator pool started with {} workers", workers);
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Combine `set_x[..limit]` with `set_y[..limit]` pairwise.
    ///
    /// Fails with [`SetError::LimitExceedsSet`] if either set is shorter than
    /// `limit`. Zero divisors and non-positive differences are skipped, not
    /// reported.
    pub fn combine(
        &self,
        set_x: &[BigInt],
        set_y: &[BigInt],
        limit: usize,
    ) -> Result<ResultBundle, SetError> {
        let available = set_x.len().min(set_y.len());
        if limit > available {
            return Err(SetError::LimitExceedsSet { limit, available });
        }
        if limit == 0 {
            return Ok(ResultBundle::default());
        }

        let ranges = partition(limit, self.workers);
        log::debug!("combine: limit={} split into {} sub-ranges", limit, ranges.len());

        // Indexed collect keeps the partials in sub-range order.
        let partials: Vec<ResultBundle> = self.pool.install(|| {
            ranges
                .into_par_iter()
                .map(|range| combine_range(set_x, set_y, range))
                .collect()
        });

        let mut bundle = ResultBundle::default();
        for partial in partials {
            bundle.append(partial);
        }

        for op in Operation::ALL {
            log::debug!("combine: {} survivors = {}", op, bundle.get(op).len());
        }

        Ok(bundle)
    }
}

/// One-shot [`Combinator::combine`] on a pool built for this call only.
pub fn combine(
    set_x: &[BigInt],
    set_y: &[BigInt],
    limit: usize,
    config: &CombineConfig,
) -> Result<ResultBundle, SetError> {
    Combinator::new(config)?.combine(set_x, set_y, limit)
}

fn combine_range(set_x: &[BigInt], set_y: &[BigInt], range: Range<usize>) -> ResultBundle {
    let mut local = ResultBundle::default();
    for k in range {
        combine_pair(&set_x[k], &set_y[k], &mut local);
    }
    local
}

/// Compute the five derived values of one pair and keep the probable primes.
pub fn combine_pair(x: &BigInt, y: &BigInt, out: &mut ResultBundle) {
    let product = x * y;
    if is_probable_prime(&product) {
        out.product.push(product);
    }

    let sum = x + y;
    if is_probable_prime(&sum) {
        out.sum.push(sum);
    }

    // Non-positive differences are excluded outright.
    let difference = x - y;
    if difference.is_positive() && is_probable_prime(&difference) {
        out.difference.push(difference);
    }

    if let Some((quotient, remainder)) = checked_div_rem(x, y) {
        if is_probable_prime(&quotient) {
            out.quotient.push(quotient);
        }
        if is_probable_prime(&remainder) {
            out.remainder.push(remainder);
        }
    }
}

/// Split `[0, limit)` into at most `workers` contiguous sub-ranges whose
/// lengths differ by at most one.
pub fn partition(limit: usize, workers: usize) -> Vec<Range<usize>> {
    if limit == 0 {
        return Vec::new();
    }
    let parts = workers.clamp(1, limit);
    let base = limit / parts;
    let extra = limit % parts;

    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 0..parts {
        let len = base + usize::from(i < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// Register each non-empty bundle sequence under a freshly minted name, in
/// the order product, sum, difference, quotient, remainder. Empty sequences
/// consume no name.
pub fn register_results(
    registry: &mut Registry,
    bundle: ResultBundle,
) -> Result<Vec<RegisteredSet>, SetError> {
    let mut registered = Vec::new();
    for (operation, values) in bundle.into_collections() {
        let len = values.len();
        if let Some(name) = registry.register_nonempty(values)? {
            log::info!("registered {} ({} {} survivors)", name, len, operation);
            registered.push(RegisteredSet {
                name,
                operation,
                len,
            });
        }
    }
    Ok(registered)
}
