//! Benchmark problems
//!
//! Standard continuous test functions, each stated as a minimization
//! over its canonical box.

use std::f64::consts::PI;

use crate::problem::Problem;

/// Sphere function: f(x) = Σxᵢ²
///
/// Unimodal, convex, separable. Optimum at the origin.
#[derive(Clone, Debug)]
pub struct Sphere {
    lb: Vec<f64>,
    ub: Vec<f64>,
}

impl Sphere {
    /// Create a sphere problem on the canonical box [-5.12, 5.12]^dim.
    pub fn new(dimension: usize) -> Self {
        Self::with_bounds(dimension, -5.12, 5.12)
    }

    /// Create a sphere problem on [lo, hi]^dim.
    pub fn with_bounds(dimension: usize, lo: f64, hi: f64) -> Self {
        Self {
            lb: vec![lo; dimension],
            ub: vec![hi; dimension],
        }
    }
}

impl Problem for Sphere {
    fn dimension(&self) -> usize {
        self.lb.len()
    }

    fn bounds(&self) -> (&[f64], &[f64]) {
        (&self.lb, &self.ub)
    }

    fn objfun(&self, x: &[f64]) -> Vec<f64> {
        vec![x.iter().map(|xi| xi * xi).sum()]
    }

    fn name(&self) -> String {
        "Sphere".to_string()
    }

    fn clone_box(&self) -> Box<dyn Problem> {
        Box::new(self.clone())
    }
}

/// Rosenbrock function: f(x) = Σ[100(xᵢ₊₁-xᵢ²)² + (1-xᵢ)²]
///
/// Valley structure, non-separable. Optimum at (1, ..., 1).
#[derive(Clone, Debug)]
pub struct Rosenbrock {
    lb: Vec<f64>,
    ub: Vec<f64>,
}

impl Rosenbrock {
    /// Create a Rosenbrock problem on the canonical box [-5, 10]^dim.
    ///
    /// # Panics
    /// Panics if `dimension < 2`.
    pub fn new(dimension: usize) -> Self {
        assert!(dimension >= 2, "Rosenbrock requires at least 2 dimensions");
        Self {
            lb: vec![-5.0; dimension],
            ub: vec![10.0; dimension],
        }
    }
}

impl Problem for Rosenbrock {
    fn dimension(&self) -> usize {
        self.lb.len()
    }

    fn bounds(&self) -> (&[f64], &[f64]) {
        (&self.lb, &self.ub)
    }

    fn objfun(&self, x: &[f64]) -> Vec<f64> {
        let f = x
            .windows(2)
            .map(|w| {
                let xi = w[0];
                let xi1 = w[1];
                100.0 * (xi1 - xi * xi).powi(2) + (1.0 - xi).powi(2)
            })
            .sum();
        vec![f]
    }

    fn name(&self) -> String {
        "Rosenbrock".to_string()
    }

    fn clone_box(&self) -> Box<dyn Problem> {
        Box::new(self.clone())
    }
}

/// Rastrigin function: f(x) = 10n + Σ(xᵢ² - 10cos(2πxᵢ))
///
/// Highly multimodal with a regular lattice of local minima. Optimum
/// at the origin.
#[derive(Clone, Debug)]
pub struct Rastrigin {
    lb: Vec<f64>,
    ub: Vec<f64>,
}

impl Rastrigin {
    /// Create a Rastrigin problem on the canonical box [-5.12, 5.12]^dim.
    pub fn new(dimension: usize) -> Self {
        Self {
            lb: vec![-5.12; dimension],
            ub: vec![5.12; dimension],
        }
    }
}

impl Problem for Rastrigin {
    fn dimension(&self) -> usize {
        self.lb.len()
    }

    fn bounds(&self) -> (&[f64], &[f64]) {
        (&self.lb, &self.ub)
    }

    fn objfun(&self, x: &[f64]) -> Vec<f64> {
        let a = 10.0;
        let n = x.len() as f64;
        let f = a * n
            + x.iter()
                .map(|xi| xi * xi - a * (2.0 * PI * xi).cos())
                .sum::<f64>();
        vec![f]
    }

    fn name(&self) -> String {
        "Rastrigin".to_string()
    }

    fn clone_box(&self) -> Box<dyn Problem> {
        Box::new(self.clone())
    }
}
