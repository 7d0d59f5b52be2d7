//! Problem capability
//!
//! An optimization problem is anything the evolutionary core can
//! evaluate: it reports its dimensions and box bounds, computes the
//! objective at a point, and defines the fitness order. The core never
//! inspects a problem beyond this surface.

pub mod benchmarks;

pub use benchmarks::{Rastrigin, Rosenbrock, Sphere};

/// Capability set consumed by populations and algorithms.
///
/// The decision vector has `dimension()` components; the last
/// `integer_dimension()` of them are integer-valued, the rest are
/// continuous. Fitness vectors have `fitness_dimension()` components
/// and are ordered by [`compare_fitness`](Problem::compare_fitness).
pub trait Problem: Send + Sync {
    /// Total length of the decision vector.
    fn dimension(&self) -> usize;

    /// Length of the integer-valued tail of the decision vector.
    fn integer_dimension(&self) -> usize {
        0
    }

    /// Number of constraints beyond the box bounds.
    fn constraint_dimension(&self) -> usize {
        0
    }

    /// Length of the fitness vector.
    fn fitness_dimension(&self) -> usize {
        1
    }

    /// Box bounds `(lower, upper)`, each of `dimension()` length.
    fn bounds(&self) -> (&[f64], &[f64]);

    /// Evaluate the objective at `x`. Must be a pure function of `x`;
    /// it may be arbitrarily expensive.
    fn objfun(&self, x: &[f64]) -> Vec<f64>;

    /// Strict fitness order: true iff `a` is strictly better than `b`.
    ///
    /// The default orders scalar fitness by minimization.
    fn compare_fitness(&self, a: &[f64], b: &[f64]) -> bool {
        a[0] < b[0]
    }

    /// True when the problem must only be evaluated on the thread that
    /// owns it. A blocking problem forces its island to evolve inline
    /// instead of on a worker thread.
    fn is_blocking(&self) -> bool {
        false
    }

    /// Problem name for reports.
    fn name(&self) -> String;

    /// Deep copy behind a fresh box.
    fn clone_box(&self) -> Box<dyn Problem>;
}

impl Clone for Box<dyn Problem> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl std::fmt::Debug for Box<dyn Problem> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Problem({}, dim {})", self.name(), self.dimension())
    }
}
