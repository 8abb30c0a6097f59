//! Entry orchestration: select two sets, combine them, register the results.
//!
//! The registry is only touched here, on the calling thread, after
//! [`Combinator::combine`] has returned its merged bundle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::combinator::{register_results, CombineConfig, Combinator, RegisteredSet};
use crate::error::SetError;
use crate::registry::Registry;

/// Outcome of one combination pass.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub first: String,
    pub second: String,
    pub limit: usize,
    pub registered: Vec<RegisteredSet>,
    pub next_set_index: u64,
    pub duration: Duration,
}

/// Outcome of an auto-mode run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub passes: Vec<PassOutcome>,
    pub rounds_completed: u32,
    /// Whether the stop flag ended the run early.
    pub stopped: bool,
}

impl RunSummary {
    /// Names of every set registered during the run, in order.
    pub fn registered_names(&self) -> Vec<&str> {
        self.passes
            .iter()
            .flat_map(|pass| pass.registered.iter().map(|set| set.name.as_str()))
            .collect()
    }
}

/// Combine sets `first` and `second` and register the non-empty results.
///
/// Both names are resolved before any work starts; an unknown name aborts the
/// pass with [`SetError::UnknownSetName`] and leaves the registry unchanged.
/// `limit` defaults to the length of the shorter set.
pub fn run_pair(
    registry: &mut Registry,
    first: &str,
    second: &str,
    limit: Option<usize>,
    config: &CombineConfig,
) -> Result<PassOutcome, SetError> {
    let combinator = Combinator::new(config)?;
    run_pair_with(registry, first, second, limit, &combinator)
}

/// [`run_pair`] on an existing worker pool.
pub fn run_pair_with(
    registry: &mut Registry,
    first: &str,
    second: &str,
    limit: Option<usize>,
    combinator: &Combinator,
) -> Result<PassOutcome, SetError> {
    let start = Instant::now();

    let set_x = registry.lookup(first).inspect_err(|e| log::warn!("rejected selection: {}", e))?;
    let set_y = registry.lookup(second).inspect_err(|e| log::warn!("rejected selection: {}", e))?;

    let available = set_x.len().min(set_y.len());
    let limit = limit.unwrap_or(available);

    log::info!("combining {} x {} over {} pairs", first, second, limit);
    let bundle = combinator.combine(set_x, set_y, limit)?;

    let registered = register_results(registry, bundle)?;
    let next_set_index = registry.next_set_index();
    log::info!("Processed. Next set index is: {}", next_set_index);

    Ok(PassOutcome {
        first: first.to_string(),
        second: second.to_string(),
        limit,
        registered,
        next_set_index,
        duration: start.elapsed(),
    })
}

/// Combine every ordered pair of distinct sets, for up to `rounds` rounds.
///
/// Each round works on a snapshot of the names present when it starts, so
/// sets registered during a round are first used in the next one. `stop` is
/// checked before each pass; a pass already running always completes. All
/// passes share one worker pool.
pub fn run_auto(
    registry: &mut Registry,
    rounds: u32,
    config: &CombineConfig,
    stop: &AtomicBool,
) -> Result<RunSummary, SetError> {
    let combinator = Combinator::new(config)?;
    let mut summary = RunSummary::default();

    for round in 0..rounds {
        let names: Vec<String> = registry.names().to_vec();
        log::info!("auto round {}: {} sets", round + 1, names.len());

        for first in &names {
            for second in &names {
                if first == second {
                    continue;
                }
                if stop.load(Ordering::Relaxed) {
                    log::info!("stop requested, ending auto run");
                    summary.stopped = true;
                    return Ok(summary);
                }
                let outcome = run_pair_with(registry, first, second, None, &combinator)?;
                summary.passes.push(outcome);
            }
        }

        summary.rounds_completed += 1;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::Operation;
    use num_bigint::BigInt;
    use set_core::from_literals;

    fn registry_with(sets: &[(&str, &[u64])]) -> Registry {
        let mut registry = Registry::new(1);
        for (name, values) in sets {
            registry.seed(*name, from_literals(values)).unwrap();
        }
        registry
    }

    #[test]
    fn test_identical_prime_sets_register_nothing() {
        let mut registry = registry_with(&[("set21", &[2, 3, 5, 7]), ("set22", &[2, 3, 5, 7])]);
        let outcome = run_pair(&mut registry, "set21", "set22", None, &CombineConfig::default()).unwrap();

        assert_eq!(outcome.limit, 4);
        assert!(outcome.registered.is_empty());
        assert_eq!(outcome.next_set_index, 23);
        assert_eq!(registry.names(), ["set21", "set22"]);
    }

    #[test]
    fn test_run_pair_registers_in_operation_order() {
        // (10, 3): sum 13, difference 7, quotient 3
        // (4, 1):  sum 5, difference 3
        let mut registry = registry_with(&[("set1", &[10, 4]), ("set2", &[3, 1])]);
        let outcome = run_pair(&mut registry, "set1", "set2", None, &CombineConfig::with_workers(2)).unwrap();

        let registered: Vec<(&str, Operation, usize)> = outcome
            .registered
            .iter()
            .map(|s| (s.name.as_str(), s.operation, s.len))
            .collect();
        assert_eq!(
            registered,
            vec![
                ("set3", Operation::Sum, 2),
                ("set4", Operation::Difference, 2),
                ("set5", Operation::Quotient, 1),
            ]
        );
        assert_eq!(registry.lookup("set4").unwrap(), from_literals(&[7, 3]).as_slice());
        assert_eq!(outcome.next_set_index, 6);
    }

    #[test]
    fn test_unknown_name_leaves_registry_untouched() {
        let mut registry = registry_with(&[("set21", &[2, 3])]);
        for (a, b) in [("set21", "set99"), ("set99", "set21")] {
            let err = run_pair(&mut registry, a, b, None, &CombineConfig::default()).unwrap_err();
            assert!(matches!(err, SetError::UnknownSetName(ref n) if n == "set99"));
        }
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.next_set_index(), 22);
    }

    #[test]
    fn test_explicit_limit() {
        let mut registry = registry_with(&[("a", &[10, 10]), ("b", &[3, 7])]);
        let err = run_pair(&mut registry, "a", "b", Some(3), &CombineConfig::default()).unwrap_err();
        assert!(matches!(err, SetError::LimitExceedsSet { limit: 3, available: 2 }));
        assert!(registry.names().len() == 2);

        let outcome = run_pair(&mut registry, "a", "b", Some(1), &CombineConfig::default()).unwrap();
        assert_eq!(outcome.limit, 1);
        let sums = registry.lookup(&outcome.registered[0].name).unwrap();
        assert_eq!(sums, [BigInt::from(13)].as_slice());
    }

    #[test]
    fn test_set_combined_with_itself() {
        // x - x = 0 and x / x = 1 never survive; x + x and x * x are even or square.
        let mut registry = registry_with(&[("p", &[2, 3, 5, 7, 11])]);
        let outcome = run_pair(&mut registry, "p", "p", None, &CombineConfig::default()).unwrap();
        assert!(outcome.registered.is_empty());
    }

    #[test]
    fn test_auto_runs_every_ordered_pair() {
        let mut registry = registry_with(&[("set1", &[10, 4]), ("set2", &[3, 1])]);
        let stop = AtomicBool::new(false);
        let summary = run_auto(&mut registry, 1, &CombineConfig::with_workers(2), &stop).unwrap();

        assert_eq!(summary.rounds_completed, 1);
        assert!(!summary.stopped);
        let pairs: Vec<(&str, &str)> = summary
            .passes
            .iter()
            .map(|p| (p.first.as_str(), p.second.as_str()))
            .collect();
        assert_eq!(pairs, vec![("set1", "set2"), ("set2", "set1")]);
        assert_eq!(summary.registered_names().len(), registry.len() - 2);
    }

    #[test]
    fn test_auto_honours_stop_flag() {
        let mut registry = registry_with(&[("set1", &[10]), ("set2", &[3])]);
        let stop = AtomicBool::new(true);
        let summary = run_auto(&mut registry, 3, &CombineConfig::default(), &stop).unwrap();

        assert!(summary.stopped);
        assert!(summary.passes.is_empty());
        assert_eq!(summary.rounds_completed, 0);
        assert_eq!(registry.len(), 2);
    }
}
