//! Concrete migration policies

use crate::migration::{MigrationRate, ReplacementPolicy, SelectionPolicy};
use crate::population::{Individual, Population};
use crate::problem::Problem;
use crate::rng::RandomSource;

/// Emigrate the best individuals, ranked by current fitness.
#[derive(Clone, Debug)]
pub struct BestSelection {
    rate: MigrationRate,
}

impl BestSelection {
    /// Select the `rate` best individuals for emigration.
    pub fn new(rate: MigrationRate) -> Self {
        Self { rate }
    }
}

impl Default for BestSelection {
    fn default() -> Self {
        Self::new(MigrationRate::Absolute(1))
    }
}

impl SelectionPolicy for BestSelection {
    fn select(&mut self, pop: &Population) -> Vec<Individual> {
        let count = self.rate.resolve(pop.len());
        let mut order: Vec<usize> = (0..pop.len()).collect();
        order.sort_by(|&a, &b| {
            if pop.problem().compare_fitness(&pop[a].cur_f, &pop[b].cur_f) {
                std::cmp::Ordering::Less
            } else if pop.problem().compare_fitness(&pop[b].cur_f, &pop[a].cur_f) {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        });
        order.into_iter().take(count).map(|i| pop[i].clone()).collect()
    }

    fn name(&self) -> String {
        format!("Best selection ({:?})", self.rate)
    }

    fn clone_box(&self) -> Box<dyn SelectionPolicy> {
        Box::new(self.clone())
    }
}

/// Emigrate individuals drawn at random, without repetition.
#[derive(Clone, Debug)]
pub struct RandomSelection {
    rate: MigrationRate,
    rng: RandomSource,
}

impl RandomSelection {
    /// Select `rate` distinct individuals at random.
    pub fn new(rate: MigrationRate) -> Self {
        Self {
            rate,
            rng: RandomSource::from_entropy(),
        }
    }

    /// Replace the random stream with a seeded one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = RandomSource::seeded(seed);
        self
    }
}

impl SelectionPolicy for RandomSelection {
    fn select(&mut self, pop: &Population) -> Vec<Individual> {
        let count = self.rate.resolve(pop.len());
        let mut idx: Vec<usize> = (0..pop.len()).collect();
        // partial Fisher-Yates: the first `count` entries end up random
        for k in 0..count {
            let j = k + self.rng.below(idx.len() - k);
            idx.swap(k, j);
        }
        idx.into_iter().take(count).map(|i| pop[i].clone()).collect()
    }

    fn name(&self) -> String {
        format!("Random selection ({:?})", self.rate)
    }

    fn clone_box(&self) -> Box<dyn SelectionPolicy> {
        Box::new(self.clone())
    }
}

/// Place the best immigrants into the worst slots, but only where the
/// immigrant actually beats the native.
#[derive(Clone, Debug)]
pub struct FairReplacement {
    rate: MigrationRate,
}

impl FairReplacement {
    /// Consider up to `rate` placements per migration.
    pub fn new(rate: MigrationRate) -> Self {
        Self { rate }
    }
}

impl Default for FairReplacement {
    fn default() -> Self {
        Self::new(MigrationRate::Absolute(1))
    }
}

impl ReplacementPolicy for FairReplacement {
    fn select(&mut self, immigrants: &[Individual], pop: &Population) -> Vec<(usize, usize)> {
        let count = self.rate.resolve(pop.len()).min(immigrants.len());

        // immigrants best-first
        let mut incoming: Vec<usize> = (0..immigrants.len()).collect();
        incoming.sort_by(|&a, &b| {
            if pop
                .problem()
                .compare_fitness(&immigrants[a].cur_f, &immigrants[b].cur_f)
            {
                std::cmp::Ordering::Less
            } else if pop
                .problem()
                .compare_fitness(&immigrants[b].cur_f, &immigrants[a].cur_f)
            {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        });

        // natives worst-first
        let mut natives: Vec<usize> = (0..pop.len()).collect();
        natives.sort_by(|&a, &b| {
            if pop.problem().compare_fitness(&pop[a].cur_f, &pop[b].cur_f) {
                std::cmp::Ordering::Greater
            } else if pop.problem().compare_fitness(&pop[b].cur_f, &pop[a].cur_f) {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        });

        incoming
            .into_iter()
            .zip(natives)
            .take(count)
            .filter(|&(imm, slot)| {
                pop.problem()
                    .compare_fitness(&immigrants[imm].cur_f, &pop[slot].cur_f)
            })
            .map(|(imm, slot)| (slot, imm))
            .collect()
    }

    fn name(&self) -> String {
        format!("Fair replacement ({:?})", self.rate)
    }

    fn clone_box(&self) -> Box<dyn ReplacementPolicy> {
        Box::new(self.clone())
    }
}

/// Place random immigrants into random distinct slots, unconditionally.
#[derive(Clone, Debug)]
pub struct RandomReplacement {
    rate: MigrationRate,
    rng: RandomSource,
}

impl RandomReplacement {
    /// Perform up to `rate` random placements per migration.
    pub fn new(rate: MigrationRate) -> Self {
        Self {
            rate,
            rng: RandomSource::from_entropy(),
        }
    }

    /// Replace the random stream with a seeded one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = RandomSource::seeded(seed);
        self
    }
}

impl ReplacementPolicy for RandomReplacement {
    fn select(&mut self, immigrants: &[Individual], pop: &Population) -> Vec<(usize, usize)> {
        let count = self.rate.resolve(pop.len()).min(immigrants.len());
        if count == 0 {
            return Vec::new();
        }
        let mut slots: Vec<usize> = (0..pop.len()).collect();
        for k in 0..count {
            let j = k + self.rng.below(slots.len() - k);
            slots.swap(k, j);
        }
        (0..count)
            .map(|k| (slots[k], self.rng.below(immigrants.len())))
            .collect()
    }

    fn name(&self) -> String {
        format!("Random replacement ({:?})", self.rate)
    }

    fn clone_box(&self) -> Box<dyn ReplacementPolicy> {
        Box::new(self.clone())
    }
}
