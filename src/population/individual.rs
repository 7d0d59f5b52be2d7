//! Individual and champion types

use serde::{Deserialize, Serialize};

/// One slot of a population.
///
/// Holds the current decision vector and fitness, the velocity (the
/// component-wise difference from the previous accepted position), and
/// the best point this slot has ever held.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// Current decision vector
    pub cur_x: Vec<f64>,
    /// Current velocity
    pub cur_v: Vec<f64>,
    /// Current fitness
    pub cur_f: Vec<f64>,
    /// Best decision vector seen by this slot
    pub best_x: Vec<f64>,
    /// Fitness of `best_x`
    pub best_f: Vec<f64>,
}

impl Individual {
    /// Create an individual at `x` with fitness `f`, zero velocity, and
    /// best-so-far equal to the current point.
    pub fn new(x: Vec<f64>, f: Vec<f64>) -> Self {
        let dim = x.len();
        Self {
            best_x: x.clone(),
            best_f: f.clone(),
            cur_x: x,
            cur_v: vec![0.0; dim],
            cur_f: f,
        }
    }
}

/// The best point a population has ever observed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    /// Decision vector of the champion
    pub x: Vec<f64>,
    /// Fitness of the champion
    pub f: Vec<f64>,
}
