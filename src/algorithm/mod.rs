//! Evolutionary algorithms
//!
//! An algorithm is anything that can advance a population by one call:
//! it reads and writes individuals through the population's interface
//! and keeps whatever per-run state it needs across calls.

pub mod sade;

pub use sade::{ExitCheckSchedule, Sade};

use crate::error::EvolveError;
use crate::population::Population;

/// Capability set of an evolutionary algorithm.
pub trait Algorithm: Send {
    /// Advance the population by one run of the algorithm.
    ///
    /// Validates the problem/population shape first and leaves the
    /// population untouched on rejection.
    fn evolve(&mut self, pop: &mut Population) -> Result<(), EvolveError>;

    /// True when the algorithm must run on the thread that owns it.
    fn is_blocking(&self) -> bool {
        false
    }

    /// Algorithm name for reports.
    fn name(&self) -> String;

    /// Parameter summary for reports.
    fn extra_info(&self) -> String {
        String::new()
    }

    /// Deep copy behind a fresh box.
    fn clone_box(&self) -> Box<dyn Algorithm>;
}

impl Clone for Box<dyn Algorithm> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl std::fmt::Debug for Box<dyn Algorithm> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Algorithm({})", self.name())
    }
}
