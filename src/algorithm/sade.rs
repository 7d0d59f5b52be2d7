//! Self-adaptive Differential Evolution
//!
//! Differential evolution with per-individual self-adaptation of the
//! amplification factor F and the crossover probability CR, in the
//! style of jDE. Eighteen mutation/crossover variants are available;
//! two adaptation schemes control how F and CR evolve alongside the
//! population.

use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;
use crate::error::{EvolveError, ParameterError};
use crate::population::Population;
use crate::problem::Problem;
use crate::rng::RandomSource;

/// Schedule on which the x/f tolerance exit conditions are evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitCheckSchedule {
    /// Test on every generation whose index is not a multiple of 40,
    /// skipping the multiples themselves. Default; kept for
    /// compatibility with runs tuned against this cadence.
    SkipMultiplesOfForty,
    /// Test once every 40th generation.
    EveryFortieth,
}

impl Default for ExitCheckSchedule {
    fn default() -> Self {
        Self::SkipMultiplesOfForty
    }
}

/// Self-adaptive Differential Evolution.
///
/// Construct with [`Sade::new`], optionally seed with
/// [`with_seed`](Sade::with_seed), and hand it to an island or call
/// [`evolve`](Algorithm::evolve) directly.
///
/// The F/CR vectors live as long as the algorithm instance, so
/// successive `evolve` calls continue adapting where the previous call
/// left off. They are re-drawn when the population size changes or
/// when the `restart` flag is set.
#[derive(Clone, Debug)]
pub struct Sade {
    gen: usize,
    variant: u32,
    adaptation: u32,
    ftol: f64,
    xtol: f64,
    restart: bool,
    exit_check: ExitCheckSchedule,
    f: Vec<f64>,
    cr: Vec<f64>,
    rng: RandomSource,
}

impl Sade {
    /// Create the algorithm.
    ///
    /// * `gen` - number of generations per `evolve` call
    /// * `variant` - mutation/crossover variant, one of 1..=18
    /// * `adaptation` - adaptation scheme: 0 (jDE-style) or 1
    ///   (de-randomized normal walk)
    /// * `ftol`, `xtol` - non-negative stopping tolerances
    /// * `restart` - when true, the F/CR vectors are re-drawn on every
    ///   `evolve` call instead of carrying over
    pub fn new(
        gen: usize,
        variant: u32,
        adaptation: u32,
        ftol: f64,
        xtol: f64,
        restart: bool,
    ) -> Result<Self, ParameterError> {
        if !(1..=18).contains(&variant) {
            return Err(ParameterError::Variant(variant));
        }
        if adaptation > 1 {
            return Err(ParameterError::AdaptationScheme(adaptation));
        }
        if !(ftol >= 0.0) {
            return Err(ParameterError::NegativeTolerance(ftol));
        }
        if !(xtol >= 0.0) {
            return Err(ParameterError::NegativeTolerance(xtol));
        }
        Ok(Self {
            gen,
            variant,
            adaptation,
            ftol,
            xtol,
            restart,
            exit_check: ExitCheckSchedule::default(),
            f: Vec::new(),
            cr: Vec::new(),
            rng: RandomSource::from_entropy(),
        })
    }

    /// Replace the random streams with seeded ones.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = RandomSource::seeded(seed);
        self
    }

    /// Select when the tolerance exit conditions are tested.
    pub fn with_exit_check(mut self, schedule: ExitCheckSchedule) -> Self {
        self.exit_check = schedule;
        self
    }

    /// Generations per `evolve` call.
    pub fn generations(&self) -> usize {
        self.gen
    }

    /// Mutation/crossover variant in 1..=18.
    pub fn variant(&self) -> u32 {
        self.variant
    }

    /// Adaptation scheme: 0 or 1.
    pub fn adaptation_scheme(&self) -> u32 {
        self.adaptation
    }

    /// Draw seven indices from 0..np, all distinct from each other and
    /// from `i`. Rejection sampling; terminates because np >= 8.
    fn pick_distinct(&mut self, i: usize, np: usize) -> [usize; 7] {
        let mut out = [0usize; 7];
        for k in 0..7 {
            loop {
                let r = self.rng.below(np);
                if r != i && !out[..k].contains(&r) {
                    out[k] = r;
                    break;
                }
            }
        }
        out
    }

    /// Trial values for F and CR under the configured scheme.
    fn adapt_parameters(&mut self, i: usize, r: &[usize; 7]) -> (f64, f64) {
        if self.adaptation == 1 {
            let f_trial = self.f[i]
                + self.rng.normal(0.0, 0.5) * (self.f[r[0]] - self.f[r[1]])
                + self.rng.normal(0.0, 0.5) * (self.f[r[2]] - self.f[r[3]])
                + self.rng.normal(0.0, 0.5) * (self.f[r[4]] - self.f[r[5]]);
            let cr_trial = self.cr[i]
                + self.rng.normal(0.0, 0.5) * (self.cr[r[0]] - self.cr[r[1]])
                + self.rng.normal(0.0, 0.5) * (self.cr[r[2]] - self.cr[r[3]])
                + self.rng.normal(0.0, 0.5) * (self.cr[r[4]] - self.cr[r[5]]);
            (f_trial, cr_trial)
        } else {
            let f_trial = if self.rng.uniform01() < 0.9 {
                self.f[i]
            } else {
                self.rng.uniform(0.1, 1.0)
            };
            let cr_trial = if self.rng.uniform01() < 0.9 {
                self.cr[i]
            } else {
                self.rng.uniform(0.0, 1.0)
            };
            (f_trial, cr_trial)
        }
    }
}

/// Exponential crossover: starting at a random position, keep writing
/// the donor expression into consecutive (cyclic) positions while a
/// uniform draw stays below `cr`, for at most `cont_dim` updates.
fn crossover_exponential(
    tmp: &mut [f64],
    rng: &mut RandomSource,
    cr: f64,
    cont_dim: usize,
    donor: impl Fn(usize, &[f64]) -> f64,
) {
    let mut n = rng.below(cont_dim);
    let mut l = 0;
    loop {
        tmp[n] = donor(n, tmp);
        n = (n + 1) % cont_dim;
        l += 1;
        if !(rng.uniform01() < cr && l < cont_dim) {
            break;
        }
    }
}

/// Binomial crossover: `cont_dim` trials over the cyclic positions
/// starting at a random one; each position is overwritten when a
/// uniform draw stays below `cr`, and the final position is always
/// overwritten so at least one component changes.
fn crossover_binomial(
    tmp: &mut [f64],
    rng: &mut RandomSource,
    cr: f64,
    cont_dim: usize,
    donor: impl Fn(usize, &[f64]) -> f64,
) {
    let mut n = rng.below(cont_dim);
    for l in 0..cont_dim {
        if rng.uniform01() < cr || l + 1 == cont_dim {
            tmp[n] = donor(n, tmp);
        }
        n = (n + 1) % cont_dim;
    }
}

impl Algorithm for Sade {
    fn evolve(&mut self, pop: &mut Population) -> Result<(), EvolveError> {
        let dim = pop.problem().dimension();
        let cont_dim = dim - pop.problem().integer_dimension();
        if cont_dim == 0 {
            return Err(EvolveError::NoContinuousPart);
        }
        let constraints = pop.problem().constraint_dimension();
        if constraints != 0 {
            return Err(EvolveError::Constrained(constraints));
        }
        let objectives = pop.problem().fitness_dimension();
        if objectives != 1 {
            return Err(EvolveError::MultiObjective(objectives));
        }
        let np = pop.len();
        if np < 8 {
            return Err(EvolveError::PopulationTooSmall(np));
        }
        if self.gen == 0 {
            return Ok(());
        }

        let (lb, ub) = {
            let (l, u) = pop.problem().bounds();
            (l.to_vec(), u.to_vec())
        };

        let mut popold: Vec<Vec<f64>> = pop.iter().map(|ind| ind.cur_x.clone()).collect();
        let mut fit: Vec<Vec<f64>> = pop.iter().map(|ind| ind.cur_f.clone()).collect();
        let mut popnew = popold.clone();

        // Running best: seeded from the champion, updated on every
        // accepted improvement. gb_iter is the snapshot the mutation
        // expressions read; it is frozen for the duration of a sweep.
        let (mut gbx, mut gbfit) = {
            let champ = pop
                .champion()
                .expect("non-empty population carries a champion");
            (champ.x.clone(), champ.f.clone())
        };
        let mut gb_iter = gbx.clone();

        // (Re)initialize the F and CR vectors
        if self.cr.len() != np || self.f.len() != np || self.restart {
            self.cr = (0..np)
                .map(|_| {
                    if self.adaptation == 1 {
                        self.rng.normal(0.5, 0.15)
                    } else {
                        self.rng.uniform(0.0, 1.0)
                    }
                })
                .collect();
            self.f = (0..np)
                .map(|_| {
                    if self.adaptation == 1 {
                        self.rng.normal(0.5, 0.15)
                    } else {
                        self.rng.uniform(0.1, 1.0)
                    }
                })
                .collect();
        }

        for gen in 0..self.gen {
            for i in 0..np {
                let r = self.pick_distinct(i, np);
                let [r1, r2, r3, r4, r5, r6, r7] = r;
                let (f_trial, cr_trial) = self.adapt_parameters(i, &r);

                let mut tmp = popold[i].clone();
                match self.variant {
                    // DE/best/1/exp
                    1 => crossover_exponential(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        gb_iter[n] + f_trial * (popold[r2][n] - popold[r3][n])
                    }),
                    // DE/rand/1/exp
                    2 => crossover_exponential(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        popold[r1][n] + f_trial * (popold[r2][n] - popold[r3][n])
                    }),
                    // DE/rand-to-best/1/exp
                    3 => crossover_exponential(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, t| {
                        t[n] + f_trial * (gb_iter[n] - t[n])
                            + f_trial * (popold[r1][n] - popold[r2][n])
                    }),
                    // DE/best/2/exp
                    4 => crossover_exponential(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        gb_iter[n]
                            + (popold[r1][n] + popold[r2][n] - popold[r3][n] - popold[r4][n])
                                * f_trial
                    }),
                    // DE/rand/2/exp
                    5 => crossover_exponential(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        popold[r5][n]
                            + (popold[r1][n] + popold[r2][n] - popold[r3][n] - popold[r4][n])
                                * f_trial
                    }),
                    // DE/best/1/bin
                    6 => crossover_binomial(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        gb_iter[n] + f_trial * (popold[r2][n] - popold[r3][n])
                    }),
                    // DE/rand/1/bin
                    7 => crossover_binomial(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        popold[r1][n] + f_trial * (popold[r2][n] - popold[r3][n])
                    }),
                    // DE/rand-to-best/1/bin
                    8 => crossover_binomial(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, t| {
                        t[n] + f_trial * (gb_iter[n] - t[n])
                            + f_trial * (popold[r1][n] - popold[r2][n])
                    }),
                    // DE/best/2/bin
                    9 => crossover_binomial(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        gb_iter[n]
                            + (popold[r1][n] + popold[r2][n] - popold[r3][n] - popold[r4][n])
                                * f_trial
                    }),
                    // DE/rand/2/bin
                    10 => crossover_binomial(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        popold[r5][n]
                            + (popold[r1][n] + popold[r2][n] - popold[r3][n] - popold[r4][n])
                                * f_trial
                    }),
                    // DE/best/3/exp
                    11 => crossover_exponential(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        gb_iter[n]
                            + f_trial * (popold[r1][n] - popold[r2][n])
                            + f_trial * (popold[r3][n] - popold[r4][n])
                            + f_trial * (popold[r5][n] - popold[r6][n])
                    }),
                    // DE/best/3/bin
                    12 => crossover_binomial(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        gb_iter[n]
                            + f_trial * (popold[r1][n] - popold[r2][n])
                            + f_trial * (popold[r3][n] - popold[r4][n])
                            + f_trial * (popold[r5][n] - popold[r6][n])
                    }),
                    // DE/rand/3/exp
                    13 => crossover_exponential(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        popold[r7][n]
                            + f_trial * (popold[r1][n] - popold[r2][n])
                            + f_trial * (popold[r3][n] - popold[r4][n])
                            + f_trial * (popold[r5][n] - popold[r6][n])
                    }),
                    // DE/rand/3/bin
                    14 => crossover_binomial(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        popold[r7][n]
                            + f_trial * (popold[r1][n] - popold[r2][n])
                            + f_trial * (popold[r3][n] - popold[r4][n])
                            + f_trial * (popold[r5][n] - popold[r6][n])
                    }),
                    // DE/rand-to-current/2/exp
                    15 => crossover_exponential(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        popold[r7][n]
                            + f_trial * (popold[r1][n] - popold[i][n])
                            + f_trial * (popold[r3][n] - popold[r4][n])
                    }),
                    // DE/rand-to-current/2/bin
                    16 => crossover_binomial(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        popold[r7][n]
                            + f_trial * (popold[r1][n] - popold[i][n])
                            + f_trial * (popold[r3][n] - popold[r4][n])
                    }),
                    // DE/rand-to-best-and-current/2/exp
                    17 => crossover_exponential(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        popold[r7][n]
                            + f_trial * (popold[r1][n] - popold[i][n])
                            + f_trial * (gb_iter[n] - popold[r4][n])
                    }),
                    // DE/rand-to-best-and-current/2/bin
                    18 => crossover_binomial(&mut tmp, &mut self.rng, cr_trial, cont_dim, |n, _| {
                        popold[r7][n]
                            + f_trial * (popold[r1][n] - popold[i][n])
                            + f_trial * (gb_iter[n] - popold[r4][n])
                    }),
                    _ => unreachable!("variant is validated at construction"),
                }

                // Feasibility: out-of-box continuous components are
                // redrawn uniformly inside their bounds.
                for (j, v) in tmp.iter_mut().enumerate().take(cont_dim) {
                    if *v < lb[j] || *v > ub[j] {
                        *v = self.rng.uniform(lb[j], ub[j]);
                    }
                }

                // Greedy selection; an accepted trial adopts its F/CR
                // and moves the individual, which also gives it a
                // velocity.
                let newfitness = pop.problem().objfun(&tmp);
                if pop.problem().compare_fitness(&newfitness, &fit[i]) {
                    fit[i] = newfitness.clone();
                    popnew[i] = tmp.clone();
                    self.cr[i] = cr_trial;
                    self.f[i] = f_trial;
                    let velocity: Vec<f64> = tmp
                        .iter()
                        .zip(&pop[i].cur_x)
                        .map(|(t, c)| t - c)
                        .collect();
                    pop.set_xf(i, tmp.clone(), newfitness.clone());
                    pop.set_v(i, velocity);
                    if pop.problem().compare_fitness(&newfitness, &gbfit) {
                        gbfit = newfitness;
                        gbx = tmp;
                    }
                } else {
                    popnew[i] = popold[i].clone();
                }
            }

            gb_iter = gbx.clone();
            std::mem::swap(&mut popold, &mut popnew);

            let check = match self.exit_check {
                ExitCheckSchedule::SkipMultiplesOfForty => gen % 40 != 0,
                ExitCheckSchedule::EveryFortieth => (gen + 1) % 40 == 0,
            };
            if check {
                if let (Some(best), Some(worst)) = (pop.best_idx(), pop.worst_idx()) {
                    let dx: f64 = pop[worst]
                        .best_x
                        .iter()
                        .zip(&pop[best].best_x)
                        .map(|(w, b)| (w - b).abs())
                        .sum();
                    if dx < self.xtol {
                        log::debug!("sade: exit condition xtol, {dx} < {}", self.xtol);
                        return Ok(());
                    }
                    let df = (pop[worst].best_f[0] - pop[best].best_f[0]).abs();
                    if df < self.ftol {
                        log::debug!("sade: exit condition ftol, {df} < {}", self.ftol);
                        return Ok(());
                    }
                }
            }
        }
        log::debug!("sade: exit condition generations, {}", self.gen);
        Ok(())
    }

    fn name(&self) -> String {
        "Self-adaptive Differential Evolution".to_string()
    }

    fn extra_info(&self) -> String {
        format!(
            "gen:{} variant:{} adaptation:{} ftol:{} xtol:{} restart:{}",
            self.gen, self.variant, self.adaptation, self.ftol, self.xtol, self.restart
        )
    }

    fn clone_box(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}
