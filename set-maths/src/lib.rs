//! set-maths: prime-filtered combination of named BigInt sets.
//!
//! Two named sets are combined index by index (product, sum, positive
//! difference, truncating quotient, remainder); probable-prime results become
//! new named sets, and the whole registry can be exported as a CSV table.
//!
//! Typical flow: seed a [`Registry`], call [`run_pair`] (or [`run_auto`]),
//! then [`export`] the registry. [`run_lucas_lehmer`] tests a single Mersenne
//! exponent with a resumable on-disk checkpoint.

pub mod checkpoint;
pub mod combinator;
pub mod error;
pub mod export;
pub mod orchestrate;
pub mod registry;
pub mod seed;

pub use checkpoint::{
    load_checkpoint, run_lucas_lehmer, save_checkpoint, LucasLehmerCheckpoint, LucasLehmerOutcome,
    LucasLehmerRun,
};
pub use combinator::{
    combine, register_results, CombineConfig, Combinator, Operation, RegisteredSet, ResultBundle,
};
pub use error::SetError;
pub use export::{export, export_to_writer, render_table, ExportSummary};
pub use orchestrate::{run_auto, run_pair, run_pair_with, PassOutcome, RunSummary};
pub use registry::Registry;
