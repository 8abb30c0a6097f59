//! Resumable Lucas-Lehmer runs.
//!
//! Progress is saved as JSON `{ "p", "iteration", "s" }` with the residue in
//! lowercase hex. A checkpoint for the same exponent is resumed; one for a
//! different exponent is ignored and overwritten. The file is removed once the
//! run finishes.

use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use num_bigint::{BigInt, BigUint};
use serde::{Deserialize, Serialize};
use set_core::{is_probable_prime, lucas_lehmer, LucasLehmer};
use tempfile::NamedTempFile;

use crate::error::SetError;

/// Default iterations between checkpoint writes.
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 1000;

/// On-disk state of an unfinished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LucasLehmerCheckpoint {
    pub p: u64,
    pub iteration: u64,
    /// Residue s mod M_p, lowercase hex.
    pub s: String,
}

impl LucasLehmerCheckpoint {
    pub fn capture(run: &LucasLehmer) -> Self {
        Self {
            p: run.p(),
            iteration: run.iteration(),
            s: run.residue().to_str_radix(16),
        }
    }

    /// Rebuild the run, or explain why the stored state is unusable.
    pub fn restore(&self) -> Result<LucasLehmer, String> {
        let residue = BigUint::parse_bytes(self.s.as_bytes(), 16)
            .ok_or_else(|| format!("residue '{}' is not hex", self.s))?;
        LucasLehmer::resume(self.p, self.iteration, residue).ok_or_else(|| {
            format!(
                "iteration {} or residue out of range for p={}",
                self.iteration, self.p
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LucasLehmerOutcome {
    Prime,
    Composite,
    /// Stopped with a checkpoint saved after `iteration` squarings.
    Interrupted { iteration: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LucasLehmerRun {
    pub p: u64,
    pub outcome: LucasLehmerOutcome,
    /// Iteration the run picked up from, if a checkpoint was resumed.
    pub resumed_from: Option<u64>,
}

/// Write `checkpoint` to `path`, replacing the previous one atomically.
pub fn save_checkpoint(path: &Path, checkpoint: &LucasLehmerCheckpoint) -> Result<(), SetError> {
    let checkpoint_err = |e: io::Error| SetError::Checkpoint {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(checkpoint_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, checkpoint).map_err(|e| checkpoint_err(e.into()))?;
        writer.flush().map_err(checkpoint_err)?;
    }
    tmp.persist(path).map_err(|e| checkpoint_err(e.error))?;
    Ok(())
}

/// Read the checkpoint at `path`; `Ok(None)` if there is none.
pub fn load_checkpoint(path: &Path) -> Result<Option<LucasLehmerCheckpoint>, SetError> {
    let checkpoint_err = |reason: String| SetError::Checkpoint {
        path: path.to_path_buf(),
        reason,
    };

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(checkpoint_err(e.to_string())),
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| checkpoint_err(e.to_string()))
}

/// Test M_p with Lucas-Lehmer, saving progress to `path` every `interval`
/// iterations.
///
/// `stop` is checked after each save; when set, the run returns
/// [`LucasLehmerOutcome::Interrupted`] and the checkpoint stays on disk.
pub fn run_lucas_lehmer(
    p: u64,
    path: &Path,
    interval: u64,
    stop: &AtomicBool,
) -> Result<LucasLehmerRun, SetError> {
    let finished = |is_prime: bool, resumed_from: Option<u64>| LucasLehmerRun {
        p,
        outcome: if is_prime {
            LucasLehmerOutcome::Prime
        } else {
            LucasLehmerOutcome::Composite
        },
        resumed_from,
    };

    // p = 2 and composite exponents are decided without iterating.
    if p < 3 || !is_probable_prime(&BigInt::from(p)) {
        return Ok(finished(lucas_lehmer(p), None));
    }

    let (mut run, resumed_from) = match load_checkpoint(path)? {
        Some(saved) if saved.p == p => {
            let run = saved.restore().map_err(|reason| SetError::Checkpoint {
                path: path.to_path_buf(),
                reason,
            })?;
            log::info!("resuming p={} from iteration {}", p, run.iteration());
            let from = run.iteration();
            (run, Some(from))
        }
        Some(saved) => {
            log::info!(
                "checkpoint at {} is for p={}; starting a new run for p={}",
                path.display(),
                saved.p,
                p
            );
            (fresh_run(p, path)?, None)
        }
        None => (fresh_run(p, path)?, None),
    };

    let interval = interval.max(1);
    while !run.is_finished() {
        run.advance(interval);
        save_checkpoint(path, &LucasLehmerCheckpoint::capture(&run))?;
        log::info!(
            "lucas-lehmer p={}: {}/{}",
            p,
            run.iteration(),
            run.total_iterations()
        );

        if stop.load(Ordering::Relaxed) && !run.is_finished() {
            log::info!("stop requested, checkpoint saved at iteration {}", run.iteration());
            return Ok(LucasLehmerRun {
                p,
                outcome: LucasLehmerOutcome::Interrupted {
                    iteration: run.iteration(),
                },
                resumed_from,
            });
        }
    }

    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("could not remove checkpoint {}: {}", path.display(), e),
    }

    Ok(finished(run.verdict() == Some(true), resumed_from))
}

fn fresh_run(p: u64, path: &Path) -> Result<LucasLehmer, SetError> {
    LucasLehmer::new(p).ok_or_else(|| SetError::Checkpoint {
        path: path.to_path_buf(),
        reason: format!("no Lucas-Lehmer run exists for p={}", p),
    })
}
