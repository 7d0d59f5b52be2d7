//! # atoll
//!
//! Island-model evolutionary optimization for Rust.
//!
//! A population of candidate solutions to a continuous optimization
//! problem is split across semi-independent islands. Each island
//! evolves its population under an algorithm — self-adaptive
//! differential evolution ships with the crate — on its own worker,
//! and periodically trades individuals with its neighbours through
//! pluggable migration policies.
//!
//! ## Core Concepts
//!
//! - **Problem as a capability**: anything that reports dimensions and
//!   box bounds, evaluates an objective, and orders fitness values can
//!   be optimized; the engine never looks deeper.
//! - **Quiescence by construction**: every public island operation
//!   drains the pending worker first, so callers always observe a
//!   settled population.
//! - **Ownership over locking**: the worker owns the island state
//!   while it runs and hands it back on join; random streams are
//!   per-island and never shared.
//!
//! ## Quick Start
//!
//! ```rust
//! use atoll::prelude::*;
//!
//! fn main() -> Result<(), IslandError> {
//!     let sade = Sade::new(200, 2, 0, 1e-6, 1e-6, false)?.with_seed(42);
//!     let mut island = Island::with_seed(
//!         &Sphere::new(10),
//!         &sade,
//!         20,
//!         0.0,
//!         &BestSelection::default(),
//!         &FairReplacement::default(),
//!         42,
//!     )?;
//!
//!     island.evolve(1)?;
//!     island.join();
//!
//!     let pop = island.population();
//!     let champion = pop.champion().expect("population is non-empty");
//!     assert!(champion.f[0] < 1e-2);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`problem`]: the [`Problem`](problem::Problem) capability and
//!   benchmark functions
//! - [`population`]: individuals, champions, and the bookkeeping that
//!   keeps them consistent
//! - [`algorithm`]: the [`Algorithm`](algorithm::Algorithm) capability
//!   and self-adaptive DE
//! - [`migration`]: selection and replacement policies
//! - [`island`]: the concurrent evolution unit
//! - [`archipelago`]: the surface an island expects from its host
//! - [`rng`]: per-island random streams
//! - [`error`]: error types

pub mod algorithm;
pub mod archipelago;
pub mod error;
pub mod island;
pub mod migration;
pub mod population;
pub mod problem;
pub mod rng;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithm::{Algorithm, ExitCheckSchedule, Sade};
    pub use crate::archipelago::Archipelago;
    pub use crate::error::{EvolveError, IslandError, IslandResult, ParameterError};
    pub use crate::island::{Island, IslandView};
    pub use crate::migration::{
        BestSelection, FairReplacement, MigrationRate, RandomReplacement, RandomSelection,
        ReplacementPolicy, SelectionPolicy,
    };
    pub use crate::population::{Champion, Individual, Population};
    pub use crate::problem::{Problem, Rastrigin, Rosenbrock, Sphere};
    pub use crate::rng::RandomSource;
}
