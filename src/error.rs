//! Error types for atoll
//!
//! Errors are split by failure domain: parameters rejected at
//! construction time, problem/population shapes an algorithm cannot
//! work with, and failures of the island's evolution worker.

use thiserror::Error;

/// A caller-supplied parameter is out of its admissible range.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterError {
    /// Mutation/crossover variant index outside 1..=18
    #[error("variant index must be one of 1 ... 18, got {0}")]
    Variant(u32),

    /// Adaptation scheme outside {0, 1}
    #[error("adaptation scheme must be 0 or 1, got {0}")]
    AdaptationScheme(u32),

    /// Negative stopping tolerance
    #[error("stopping tolerance must be non-negative, got {0}")]
    NegativeTolerance(f64),

    /// Migration probability outside [0, 1]
    #[error("migration probability must lie in [0, 1], got {0}")]
    MigrationProbability(f64),
}

/// The population or its problem is unsuitable for the algorithm.
///
/// Raised at the start of [`Algorithm::evolve`](crate::algorithm::Algorithm::evolve),
/// before any individual is touched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvolveError {
    /// The decision vector has no continuous components
    #[error("the decision vector has no continuous part to optimise")]
    NoContinuousPart,

    /// The problem carries constraints beyond its box bounds
    #[error("the problem carries {0} constraints and only box bounds are supported")]
    Constrained(usize),

    /// The fitness vector is not scalar
    #[error("the problem has {0} objectives and the algorithm is single-objective")]
    MultiObjective(usize),

    /// The population is too small for the mutation operators
    #[error("self-adaptive DE needs at least 8 individuals, the population has {0}")]
    PopulationTooSmall(usize),
}

/// Failure of an island operation.
#[derive(Debug, Error)]
pub enum IslandError {
    /// Invalid constructor argument
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// The algorithm rejected the population
    #[error(transparent)]
    Evolve(#[from] EvolveError),

    /// The evolution worker thread could not be started
    #[error("failed to launch the evolution worker: {0}")]
    WorkerLaunch(String),

    /// A pending evolution was interrupted on request
    #[error("evolution interrupted")]
    Interrupted,
}

/// Result type alias for island operations
pub type IslandResult<T> = Result<T, IslandError>;
