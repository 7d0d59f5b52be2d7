//! Population container

use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::population::individual::{Champion, Individual};
use crate::problem::Problem;
use crate::rng::RandomSource;

/// A fixed-size collection of individuals bound to a problem.
///
/// The population keeps three pieces of bookkeeping consistent across
/// every write: each slot's best-so-far, the champion (the best point
/// ever observed here), and the dominance list (for each slot, the
/// slots it dominates under the problem's fitness order).
#[derive(Clone)]
pub struct Population {
    problem: Box<dyn Problem>,
    individuals: Vec<Individual>,
    champion: Option<Champion>,
    dom_list: Vec<Vec<usize>>,
}

impl Population {
    /// Create a population of `size` random individuals drawn uniformly
    /// from the problem's box. The integer tail of each decision vector
    /// is rounded to the nearest integer.
    pub fn new(problem: Box<dyn Problem>, size: usize, rng: &mut RandomSource) -> Self {
        let dim = problem.dimension();
        let cont_dim = dim - problem.integer_dimension();
        let (lb, ub) = {
            let (l, u) = problem.bounds();
            (l.to_vec(), u.to_vec())
        };

        let xs: Vec<Vec<f64>> = (0..size)
            .map(|_| {
                (0..dim)
                    .map(|j| {
                        let v = rng.uniform(lb[j], ub[j]);
                        if j < cont_dim {
                            v
                        } else {
                            v.round()
                        }
                    })
                    .collect()
            })
            .collect();

        let fs = evaluate_all(problem.as_ref(), &xs);

        let individuals: Vec<Individual> = xs
            .into_iter()
            .zip(fs)
            .map(|(x, f)| Individual::new(x, f))
            .collect();

        let mut pop = Self {
            problem,
            individuals,
            champion: None,
            dom_list: vec![Vec::new(); size],
        };
        for idx in 0..size {
            pop.update_champion(idx);
            pop.update_dom_list(idx);
        }
        pop
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// True when the population holds no individuals.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// The problem this population is bound to.
    pub fn problem(&self) -> &dyn Problem {
        self.problem.as_ref()
    }

    /// Individual at `idx`.
    pub fn get(&self, idx: usize) -> Option<&Individual> {
        self.individuals.get(idx)
    }

    /// All individuals, in slot order.
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Iterator over the individuals.
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    /// The best point ever observed in this population, if any.
    pub fn champion(&self) -> Option<&Champion> {
        self.champion.as_ref()
    }

    /// Slots dominated by `idx` under the problem's fitness order.
    pub fn dom_list(&self, idx: usize) -> &[usize] {
        &self.dom_list[idx]
    }

    /// Index of the individual with the best current fitness.
    pub fn best_idx(&self) -> Option<usize> {
        self.rank_idx(|a, b| self.problem.compare_fitness(a, b))
    }

    /// Index of the individual with the worst current fitness.
    pub fn worst_idx(&self) -> Option<usize> {
        self.rank_idx(|a, b| self.problem.compare_fitness(b, a))
    }

    fn rank_idx(&self, better: impl Fn(&[f64], &[f64]) -> bool) -> Option<usize> {
        let mut it = self.individuals.iter().enumerate();
        let (mut top, first) = it.next()?;
        let mut top_f = &first.cur_f;
        for (idx, ind) in it {
            if better(&ind.cur_f, top_f) {
                top = idx;
                top_f = &ind.cur_f;
            }
        }
        Some(top)
    }

    /// Move slot `idx` to `x`, evaluating the objective there.
    ///
    /// Refreshes the slot's best-so-far, the champion, and the
    /// dominance list. Use [`set_xf`](Self::set_xf) when the fitness at
    /// `x` is already known.
    ///
    /// # Panics
    /// Panics if `x` has the wrong length or leaves the problem's box.
    pub fn set_x(&mut self, idx: usize, x: Vec<f64>) {
        let f = self.problem.objfun(&x);
        self.set_xf(idx, x, f);
    }

    /// Move slot `idx` to `x` with its pre-computed fitness `f`,
    /// skipping re-evaluation.
    ///
    /// `f` must be the problem's objective at `x`; the population
    /// trusts the caller here so an external evaluation is not paid
    /// twice.
    ///
    /// # Panics
    /// Panics if `x` or `f` has the wrong length, or if `x` leaves the
    /// problem's box.
    pub fn set_xf(&mut self, idx: usize, x: Vec<f64>, f: Vec<f64>) {
        assert_eq!(
            x.len(),
            self.problem.dimension(),
            "decision vector length mismatch"
        );
        assert_eq!(
            f.len(),
            self.problem.fitness_dimension(),
            "fitness vector length mismatch"
        );
        {
            let (lb, ub) = self.problem.bounds();
            assert!(
                x.iter()
                    .enumerate()
                    .all(|(j, v)| *v >= lb[j] && *v <= ub[j]),
                "decision vector outside the problem bounds"
            );
        }
        {
            let ind = &mut self.individuals[idx];
            ind.cur_x = x;
            ind.cur_f = f;
        }
        let improved = self
            .problem
            .compare_fitness(&self.individuals[idx].cur_f, &self.individuals[idx].best_f);
        if improved {
            let ind = &mut self.individuals[idx];
            ind.best_x = ind.cur_x.clone();
            ind.best_f = ind.cur_f.clone();
        }
        self.update_champion(idx);
        self.update_dom_list(idx);
    }

    /// Store velocity `v` into slot `idx`.
    ///
    /// # Panics
    /// Panics if `v` has the wrong length.
    pub fn set_v(&mut self, idx: usize, v: Vec<f64>) {
        assert_eq!(
            v.len(),
            self.problem.dimension(),
            "velocity length mismatch"
        );
        self.individuals[idx].cur_v = v;
    }

    /// Overwrite slot `idx` with a whole individual (migration), then
    /// refresh the champion and the dominance list for that slot.
    pub fn replace(&mut self, idx: usize, individual: Individual) {
        self.individuals[idx] = individual;
        self.update_champion(idx);
        self.update_dom_list(idx);
    }

    /// Refresh the champion against slot `idx`.
    ///
    /// Both the slot's current point and its best-so-far are offered:
    /// an immigrant can carry a best point better than where it
    /// currently sits.
    fn update_champion(&mut self, idx: usize) {
        let ind = &self.individuals[idx];
        match &mut self.champion {
            None => {
                self.champion = Some(Champion {
                    x: ind.cur_x.clone(),
                    f: ind.cur_f.clone(),
                });
            }
            Some(champ) => {
                if self.problem.compare_fitness(&ind.cur_f, &champ.f) {
                    champ.x = ind.cur_x.clone();
                    champ.f = ind.cur_f.clone();
                }
            }
        }
        if let Some(champ) = &mut self.champion {
            if self.problem.compare_fitness(&ind.best_f, &champ.f) {
                champ.x = ind.best_x.clone();
                champ.f = ind.best_f.clone();
            }
        }
    }

    /// Recompute domination between slot `idx` and every other slot.
    fn update_dom_list(&mut self, idx: usize) {
        self.dom_list[idx].clear();
        for j in 0..self.individuals.len() {
            if j == idx {
                continue;
            }
            let i_dominates_j = self.problem.compare_fitness(
                &self.individuals[idx].cur_f,
                &self.individuals[j].cur_f,
            );
            if i_dominates_j {
                self.dom_list[idx].push(j);
            }
            let j_dominates_i = self.problem.compare_fitness(
                &self.individuals[j].cur_f,
                &self.individuals[idx].cur_f,
            );
            let listed = self.dom_list[j].iter().position(|&k| k == idx);
            match (j_dominates_i, listed) {
                (true, None) => self.dom_list[j].push(idx),
                (false, Some(pos)) => {
                    self.dom_list[j].remove(pos);
                }
                _ => {}
            }
        }
    }

    /// One-line summary: problem, size, and champion fitness.
    pub fn human_readable_terse(&self) -> String {
        match &self.champion {
            Some(champ) => format!(
                "Problem: {} - population size: {} - champion fitness: {:?}",
                self.problem.name(),
                self.len(),
                champ.f
            ),
            None => format!(
                "Problem: {} - population size: {} - no champion",
                self.problem.name(),
                self.len()
            ),
        }
    }

    /// Full dump: summary plus one line per individual.
    pub fn human_readable(&self) -> String {
        let mut out = self.human_readable_terse();
        for (idx, ind) in self.individuals.iter().enumerate() {
            out.push_str(&format!(
                "\n#{idx}: x: {:?} f: {:?} best f: {:?}",
                ind.cur_x, ind.cur_f, ind.best_f
            ));
        }
        out
    }
}

impl fmt::Debug for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Population")
            .field("problem", &self.problem.name())
            .field("size", &self.len())
            .field("champion", &self.champion)
            .finish()
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.human_readable())
    }
}

impl std::ops::Index<usize> for Population {
    type Output = Individual;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.individuals[idx]
    }
}

/// Evaluate the objective at every point.
///
/// With the `parallel` feature the evaluations fan out over rayon,
/// unless the problem is blocking and must stay on this thread.
#[cfg(feature = "parallel")]
fn evaluate_all(problem: &dyn Problem, xs: &[Vec<f64>]) -> Vec<Vec<f64>> {
    if problem.is_blocking() {
        xs.iter().map(|x| problem.objfun(x)).collect()
    } else {
        xs.par_iter().map(|x| problem.objfun(x)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate_all(problem: &dyn Problem, xs: &[Vec<f64>]) -> Vec<Vec<f64>> {
    xs.iter().map(|x| problem.objfun(x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Sphere;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn sphere_population(size: usize, seed: u64) -> Population {
        let mut rng = RandomSource::seeded(seed);
        Population::new(Box::new(Sphere::new(3)), size, &mut rng)
    }

    /// Sphere wrapper that counts objective evaluations.
    #[derive(Clone)]
    struct CountingSphere {
        inner: Sphere,
        calls: Arc<AtomicUsize>,
    }

    impl CountingSphere {
        fn new(dimension: usize) -> Self {
            Self {
                inner: Sphere::new(dimension),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Problem for CountingSphere {
        fn dimension(&self) -> usize {
            self.inner.dimension()
        }

        fn bounds(&self) -> (&[f64], &[f64]) {
            self.inner.bounds()
        }

        fn objfun(&self, x: &[f64]) -> Vec<f64> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.inner.objfun(x)
        }

        // serial evaluation keeps the call counter exact
        fn is_blocking(&self) -> bool {
            true
        }

        fn name(&self) -> String {
            "CountingSphere".to_string()
        }

        fn clone_box(&self) -> Box<dyn Problem> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_random_population_within_bounds() {
        let pop = sphere_population(20, 42);
        let (lb, ub) = (pop.problem().bounds().0.to_vec(), pop.problem().bounds().1.to_vec());
        for ind in pop.iter() {
            for (j, x) in ind.cur_x.iter().enumerate() {
                assert!(*x >= lb[j] && *x <= ub[j]);
            }
        }
    }

    #[test]
    fn test_new_population_best_equals_current() {
        let pop = sphere_population(10, 1);
        for ind in pop.iter() {
            assert_eq!(ind.cur_x, ind.best_x);
            assert_eq!(ind.cur_f, ind.best_f);
            assert!(ind.cur_v.iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn test_champion_is_best_of_initial_population() {
        let pop = sphere_population(10, 7);
        let champ = pop.champion().unwrap();
        for ind in pop.iter() {
            assert!(!pop.problem().compare_fitness(&ind.best_f, &champ.f));
        }
    }

    #[test]
    fn test_set_x_improvement_updates_best_and_champion() {
        let mut pop = sphere_population(10, 3);
        pop.set_x(0, vec![0.0, 0.0, 0.0]);
        assert_eq!(pop[0].cur_f, vec![0.0]);
        assert_eq!(pop[0].best_f, vec![0.0]);
        assert_eq!(pop.champion().unwrap().f, vec![0.0]);
        assert_eq!(pop.champion().unwrap().x, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_set_x_regression_keeps_best() {
        let mut pop = sphere_population(10, 3);
        pop.set_x(0, vec![0.0, 0.0, 0.0]);
        pop.set_x(0, vec![5.0, 5.0, 5.0]);
        assert_eq!(pop[0].cur_f, vec![75.0]);
        // best-so-far and champion remember the origin
        assert_eq!(pop[0].best_f, vec![0.0]);
        assert_eq!(pop.champion().unwrap().f, vec![0.0]);
    }

    #[test]
    fn test_set_xf_skips_reevaluation() {
        let problem = CountingSphere::new(3);
        let calls = Arc::clone(&problem.calls);
        let mut rng = RandomSource::seeded(9);
        let mut pop = Population::new(Box::new(problem), 5, &mut rng);
        assert_eq!(calls.load(Ordering::Relaxed), 5);

        pop.set_xf(0, vec![0.0, 0.0, 0.0], vec![0.0]);
        assert_eq!(calls.load(Ordering::Relaxed), 5);

        pop.set_x(0, vec![1.0, 0.0, 0.0]);
        assert_eq!(calls.load(Ordering::Relaxed), 6);
    }

    #[test]
    #[should_panic(expected = "outside the problem bounds")]
    fn test_set_x_rejects_out_of_box_points() {
        let mut pop = sphere_population(5, 3);
        pop.set_x(0, vec![6.0, 0.0, 0.0]);
    }

    #[test]
    fn test_set_v_stores_velocity() {
        let mut pop = sphere_population(5, 2);
        pop.set_v(2, vec![0.1, -0.2, 0.3]);
        assert_eq!(pop[2].cur_v, vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn test_replace_refreshes_champion() {
        let mut pop = sphere_population(5, 2);
        let immigrant = Individual::new(vec![0.0, 0.0, 0.0], vec![0.0]);
        pop.replace(3, immigrant);
        assert_eq!(pop.champion().unwrap().f, vec![0.0]);
        assert_eq!(pop[3].cur_f, vec![0.0]);
    }

    #[test]
    fn test_replace_with_strong_best_lifts_champion() {
        let mut pop = sphere_population(5, 2);
        // an immigrant sitting at a poor point but remembering a great one
        let immigrant = Individual {
            cur_x: vec![5.0, 5.0, 5.0],
            cur_v: vec![0.0; 3],
            cur_f: vec![75.0],
            best_x: vec![0.0, 0.0, 0.0],
            best_f: vec![0.0],
        };
        pop.replace(0, immigrant);
        assert_eq!(pop.champion().unwrap().f, vec![0.0]);
    }

    #[test]
    fn test_best_and_worst_idx() {
        let mut pop = sphere_population(5, 4);
        pop.set_x(1, vec![0.0, 0.0, 0.0]);
        pop.set_x(2, vec![5.0, 5.0, 5.0]);
        assert_eq!(pop.best_idx(), Some(1));
        assert_eq!(pop.worst_idx(), Some(2));
    }

    #[test]
    fn test_dom_list_consistency() {
        let pop = sphere_population(8, 6);
        for i in 0..pop.len() {
            for &j in pop.dom_list(i) {
                assert!(pop
                    .problem()
                    .compare_fitness(&pop[i].cur_f, &pop[j].cur_f));
            }
        }
        // the best individual dominates everyone it is strictly better than
        let best = pop.best_idx().unwrap();
        let strictly_worse = (0..pop.len())
            .filter(|&j| {
                j != best
                    && pop
                        .problem()
                        .compare_fitness(&pop[best].cur_f, &pop[j].cur_f)
            })
            .count();
        assert_eq!(pop.dom_list(best).len(), strictly_worse);
    }

    #[test]
    fn test_dom_list_updates_after_set_x() {
        let mut pop = sphere_population(8, 6);
        pop.set_x(0, vec![0.0, 0.0, 0.0]);
        // slot 0 now dominates every slot with a strictly worse fitness
        for j in 1..pop.len() {
            if pop.problem().compare_fitness(&pop[0].cur_f, &pop[j].cur_f) {
                assert!(pop.dom_list(0).contains(&j));
            }
            assert!(!pop.dom_list(j).contains(&0) || pop[j].cur_f[0] < pop[0].cur_f[0]);
        }
    }

    #[test]
    fn test_empty_population() {
        let mut rng = RandomSource::seeded(0);
        let pop = Population::new(Box::new(Sphere::new(3)), 0, &mut rng);
        assert!(pop.is_empty());
        assert!(pop.champion().is_none());
        assert_eq!(pop.best_idx(), None);
        assert_eq!(pop.worst_idx(), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let pop = sphere_population(5, 8);
        let mut copy = pop.clone();
        copy.set_x(0, vec![0.0, 0.0, 0.0]);
        assert_ne!(pop[0].cur_f, copy[0].cur_f);
    }

    #[test]
    fn test_human_readable_mentions_problem_and_size() {
        let pop = sphere_population(3, 5);
        let terse = pop.human_readable_terse();
        assert!(terse.contains("Sphere"));
        assert!(terse.contains("population size: 3"));
        let full = pop.human_readable();
        assert!(full.contains("#0"));
        assert!(full.contains("#2"));
    }
}
