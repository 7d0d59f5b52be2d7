//! Evolution island
//!
//! An island owns a population, an algorithm, and a pair of migration
//! policies, and runs evolution on a worker. All public operations
//! first drain any pending worker, so callers always observe a
//! quiescent island.
//!
//! While a worker runs it has exclusive ownership of the island's
//! state: `evolve` moves the state into the worker thread and `join`
//! moves it back. Cancellation is a cooperative flag the worker polls
//! between generation rounds.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::algorithm::Algorithm;
use crate::archipelago::Archipelago;
use crate::error::{EvolveError, IslandError, IslandResult, ParameterError};
use crate::migration::{ReplacementPolicy, SelectionPolicy};
use crate::population::{Individual, Population};
use crate::problem::Problem;
use crate::rng::RandomSource;

static NEXT_ISLAND_ID: AtomicUsize = AtomicUsize::new(0);

/// Everything an island owns. Moves wholesale into the worker thread
/// for the duration of a run.
pub(crate) struct IslandState {
    population: Population,
    algorithm: Box<dyn Algorithm>,
    s_policy: Box<dyn SelectionPolicy>,
    r_policy: Box<dyn ReplacementPolicy>,
    migration_probability: f64,
    evo_time_ms: u64,
}

impl IslandState {
    fn is_blocking(&self) -> bool {
        self.population.problem().is_blocking() || self.algorithm.is_blocking()
    }

    fn accept_immigrants(&mut self, immigrants: &[Individual]) {
        let placements = self.r_policy.select(immigrants, &self.population);
        for (slot, which) in placements {
            self.population.replace(slot, immigrants[which].clone());
        }
    }

    fn emigrants(&mut self) -> Vec<Individual> {
        self.s_policy.select(&self.population)
    }
}

/// Mutable view of an island handed to the archipelago's hooks between
/// generation rounds.
pub struct IslandView<'a> {
    id: usize,
    state: &'a mut IslandState,
}

impl IslandView<'_> {
    /// Stable identifier of the island behind this view.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The island's population.
    pub fn population(&self) -> &Population {
        &self.state.population
    }

    /// The island's migration probability.
    pub fn migration_probability(&self) -> f64 {
        self.state.migration_probability
    }

    /// Deliver immigrants through the island's replacement policy.
    pub fn accept_immigrants(&mut self, immigrants: &[Individual]) {
        self.state.accept_immigrants(immigrants);
    }

    /// Collect emigrants through the island's selection policy.
    pub fn emigrants(&mut self) -> Vec<Individual> {
        self.state.emigrants()
    }
}

/// Stopping rule of a worker run.
#[derive(Clone, Copy, Debug)]
enum WorkerMode {
    /// Call the algorithm exactly this many times.
    Count(usize),
    /// Call the algorithm at least once and until this much wall-clock
    /// time has elapsed.
    Timed(Duration),
}

struct Worker {
    handle: JoinHandle<()>,
    stop: Arc<AtomicBool>,
    /// The state travels through this slot: filled before spawn, taken
    /// by the thread at startup, refilled by the thread on exit.
    slot: Arc<Mutex<Option<IslandState>>>,
}

/// A concurrent evolution unit.
///
/// Construct with [`Island::new`] (or [`with_seed`](Island::with_seed)
/// for reproducible runs), then drive it with
/// [`evolve`](Island::evolve) / [`evolve_t`](Island::evolve_t) and
/// [`join`](Island::join).
///
/// Accessors return deep clones: mutating what they hand back never
/// affects the island.
pub struct Island {
    id: usize,
    state: Option<IslandState>,
    worker: Option<Worker>,
    archipelago: Option<Arc<dyn Archipelago>>,
}

impl std::fmt::Debug for Island {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Island").field("id", &self.id).finish_non_exhaustive()
    }
}

impl Island {
    /// Create an island with a fresh random population.
    ///
    /// The problem, algorithm, and policies are deep-copied. Fails when
    /// `migration_probability` is outside [0, 1].
    pub fn new(
        problem: &dyn Problem,
        algorithm: &dyn Algorithm,
        size: usize,
        migration_probability: f64,
        s_policy: &dyn SelectionPolicy,
        r_policy: &dyn ReplacementPolicy,
    ) -> Result<Self, ParameterError> {
        let mut rng = RandomSource::from_entropy();
        Self::build(
            problem,
            algorithm,
            size,
            migration_probability,
            s_policy,
            r_policy,
            &mut rng,
        )
    }

    /// Create an island whose initial population is drawn from a seeded
    /// stream. Two islands built from identical arguments and the same
    /// seed start from identical populations.
    #[allow(clippy::too_many_arguments)]
    pub fn with_seed(
        problem: &dyn Problem,
        algorithm: &dyn Algorithm,
        size: usize,
        migration_probability: f64,
        s_policy: &dyn SelectionPolicy,
        r_policy: &dyn ReplacementPolicy,
        seed: u64,
    ) -> Result<Self, ParameterError> {
        let mut rng = RandomSource::seeded(seed);
        Self::build(
            problem,
            algorithm,
            size,
            migration_probability,
            s_policy,
            r_policy,
            &mut rng,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        problem: &dyn Problem,
        algorithm: &dyn Algorithm,
        size: usize,
        migration_probability: f64,
        s_policy: &dyn SelectionPolicy,
        r_policy: &dyn ReplacementPolicy,
        rng: &mut RandomSource,
    ) -> Result<Self, ParameterError> {
        if !(0.0..=1.0).contains(&migration_probability) {
            return Err(ParameterError::MigrationProbability(migration_probability));
        }
        let population = Population::new(problem.clone_box(), size, rng);
        Ok(Self {
            id: NEXT_ISLAND_ID.fetch_add(1, Ordering::Relaxed),
            state: Some(IslandState {
                population,
                algorithm: algorithm.clone_box(),
                s_policy: s_policy.clone_box(),
                r_policy: r_policy.clone_box(),
                migration_probability,
                evo_time_ms: 0,
            }),
            worker: None,
            archipelago: None,
        })
    }

    /// Stable identifier of this island.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Put the island under an archipelago's care. The island only ever
    /// calls the host's hooks from inside its own worker.
    pub fn attach(&mut self, archipelago: Arc<dyn Archipelago>) {
        self.join();
        self.archipelago = Some(archipelago);
    }

    /// Release the island from its archipelago.
    pub fn detach(&mut self) {
        self.join();
        self.archipelago = None;
    }

    /// Block until any pending evolution has completed.
    ///
    /// A no-op on an idle island.
    pub fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.handle.join().is_err() {
                // the worker catches panics around the evolution body,
                // so this is unreachable short of a panic in the
                // bookkeeping itself
                log::error!("island {}: worker thread panicked", self.id);
            }
            let mut slot = worker
                .slot
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(state) = slot.take() {
                self.state = Some(state);
            } else {
                log::error!("island {}: worker exited without returning state", self.id);
            }
        }
    }

    /// True iff a worker has been dispatched and not yet joined.
    pub fn busy(&self) -> bool {
        self.worker.is_some()
    }

    /// Request a pending evolution to stop at its next cooperative
    /// check-point, between generation rounds.
    ///
    /// Surfaces [`IslandError::Interrupted`] to the caller when a
    /// worker was live; does nothing on an idle island. An in-flight
    /// objective evaluation is never cancelled.
    pub fn interrupt(&mut self) -> IslandResult<()> {
        if let Some(worker) = &self.worker {
            worker.stop.store(true, Ordering::Relaxed);
            return Err(IslandError::Interrupted);
        }
        Ok(())
    }

    /// Evolve the population by calling the algorithm exactly `n`
    /// times.
    ///
    /// On a non-blocking island this dispatches a worker thread and
    /// returns immediately; on a blocking island it runs inline and
    /// any evolution error propagates to the caller.
    pub fn evolve(&mut self, n: usize) -> IslandResult<()> {
        self.run(WorkerMode::Count(n))
    }

    /// Evolve the population by calling the algorithm at least once,
    /// and then until `t_ms` milliseconds of wall-clock time have
    /// elapsed since the run started.
    pub fn evolve_t(&mut self, t_ms: u64) -> IslandResult<()> {
        self.run(WorkerMode::Timed(Duration::from_millis(t_ms)))
    }

    fn run(&mut self, mode: WorkerMode) -> IslandResult<()> {
        self.join();
        let state = self
            .state
            .as_ref()
            .expect("island state is present when no worker is live");
        if state.is_blocking() {
            self.run_inline(mode)
        } else {
            self.spawn_worker(mode)
        }
    }

    /// Blocking execution: the worker body runs on the calling thread.
    /// No barrier is awaited and no interruption points are polled.
    fn run_inline(&mut self, mode: WorkerMode) -> IslandResult<()> {
        let mut state = self
            .state
            .take()
            .expect("island state is present when no worker is live");
        let archipelago = self.archipelago.clone();
        let id = self.id;
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            run_rounds(&mut state, mode, archipelago.as_deref(), None, id, started)
        }));
        match outcome {
            Ok(Ok(())) => {
                accumulate_elapsed(&mut state, started);
                self.state = Some(state);
                Ok(())
            }
            Ok(Err(err)) => {
                self.state = Some(state);
                Err(err.into())
            }
            Err(payload) => {
                self.state = Some(state);
                panic::resume_unwind(payload);
            }
        }
    }

    fn spawn_worker(&mut self, mode: WorkerMode) -> IslandResult<()> {
        let state = self
            .state
            .take()
            .expect("island state is present when no worker is live");
        let slot = Arc::new(Mutex::new(Some(state)));
        let stop = Arc::new(AtomicBool::new(false));
        let archipelago = self.archipelago.clone();
        let id = self.id;

        let thread_slot = Arc::clone(&slot);
        let thread_stop = Arc::clone(&stop);
        let spawned = thread::Builder::new()
            .name(format!("island-{id}"))
            .spawn(move || {
                let mut state = thread_slot
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .take()
                    .expect("worker slot is filled at spawn");
                let started = Instant::now();
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    run_rounds(
                        &mut state,
                        mode,
                        archipelago.as_deref(),
                        Some(&*thread_stop),
                        id,
                        started,
                    )
                }));
                match outcome {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        log::error!("island {id}: error during evolution: {err}");
                    }
                    Err(_) => {
                        log::error!("island {id}: evolution panicked; run abandoned");
                    }
                }
                accumulate_elapsed(&mut state, started);
                *thread_slot
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(state);
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(Worker { handle, stop, slot });
                Ok(())
            }
            Err(err) => {
                // the thread never started; the state is still in the slot
                self.state = slot
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .take();
                Err(IslandError::WorkerLaunch(err.to_string()))
            }
        }
    }

    /// Cumulative wall-clock time spent evolving, in milliseconds.
    pub fn evolution_time(&mut self) -> u64 {
        self.join();
        self.state_ref().evo_time_ms
    }

    /// Deep clone of the population.
    pub fn population(&mut self) -> Population {
        self.join();
        self.state_ref().population.clone()
    }

    /// Number of individuals in the population.
    pub fn size(&mut self) -> usize {
        self.join();
        self.state_ref().population.len()
    }

    /// Deep clone of the algorithm.
    pub fn algorithm(&mut self) -> Box<dyn Algorithm> {
        self.join();
        self.state_ref().algorithm.clone_box()
    }

    /// Replace the algorithm with a deep copy of `algorithm`.
    pub fn set_algorithm(&mut self, algorithm: &dyn Algorithm) {
        self.join();
        self.state_mut().algorithm = algorithm.clone_box();
    }

    /// Deep clone of the problem.
    pub fn problem(&mut self) -> Box<dyn Problem> {
        self.join();
        self.state_ref().population.problem().clone_box()
    }

    /// Deep clone of the selection policy.
    pub fn selection_policy(&mut self) -> Box<dyn SelectionPolicy> {
        self.join();
        self.state_ref().s_policy.clone_box()
    }

    /// Deep clone of the replacement policy.
    pub fn replacement_policy(&mut self) -> Box<dyn ReplacementPolicy> {
        self.join();
        self.state_ref().r_policy.clone_box()
    }

    /// Migration probability in [0, 1].
    pub fn migration_probability(&mut self) -> f64 {
        self.join();
        self.state_ref().migration_probability
    }

    /// True when either the problem or the algorithm must run on the
    /// calling thread.
    pub fn is_blocking(&mut self) -> bool {
        self.join();
        self.state_ref().is_blocking()
    }

    /// Deliver immigrants through the replacement policy, refreshing
    /// the champion and dominance bookkeeping per placement.
    pub fn accept_immigrants(&mut self, immigrants: &[Individual]) {
        self.join();
        self.state_mut().accept_immigrants(immigrants);
    }

    /// Collect emigrants through the selection policy.
    pub fn emigrants(&mut self) -> Vec<Individual> {
        self.join();
        self.state_mut().emigrants()
    }

    /// Terse report: algorithm, evolution time, migration probability,
    /// policies, and a population summary.
    pub fn human_readable_terse(&mut self) -> String {
        self.join();
        let state = self.state_ref();
        format!(
            "{} [{}]\nEvolution time: {}ms\n\nMigration probability: {}%\n\n{}\n{}\n{}",
            state.algorithm.name(),
            state.algorithm.extra_info(),
            state.evo_time_ms,
            state.migration_probability * 100.0,
            state.s_policy.name(),
            state.r_policy.name(),
            state.population.human_readable_terse(),
        )
    }

    /// Full report: terse report plus the complete population dump.
    pub fn human_readable(&mut self) -> String {
        self.join();
        let state = self.state_ref();
        format!(
            "{} [{}]\nEvolution time: {}ms\n\nMigration probability: {}%\n\n{}\n{}\n{}",
            state.algorithm.name(),
            state.algorithm.extra_info(),
            state.evo_time_ms,
            state.migration_probability * 100.0,
            state.s_policy.name(),
            state.r_policy.name(),
            state.population.human_readable(),
        )
    }

    fn state_ref(&self) -> &IslandState {
        self.state
            .as_ref()
            .expect("island state is present when no worker is live")
    }

    fn state_mut(&mut self) -> &mut IslandState {
        self.state
            .as_mut()
            .expect("island state is present when no worker is live")
    }
}

impl Drop for Island {
    fn drop(&mut self) {
        self.join();
    }
}

/// Shared body of count-based and time-based workers.
///
/// `stop` is `Some` exactly when running off-thread; it doubles as the
/// blocking-mode switch: with `stop == None` no barrier is awaited and
/// no interruption points are polled.
fn run_rounds(
    state: &mut IslandState,
    mode: WorkerMode,
    archipelago: Option<&dyn Archipelago>,
    stop: Option<&AtomicBool>,
    id: usize,
    started: Instant,
) -> Result<(), EvolveError> {
    if let (Some(host), Some(_)) = (archipelago, stop) {
        host.sync_island_start();
    }
    let mut rounds = 0usize;
    loop {
        if let WorkerMode::Count(n) = mode {
            if rounds >= n {
                break;
            }
        }
        if let Some(host) = archipelago {
            let mut view = IslandView { id, state: &mut *state };
            host.pre_evolution(&mut view);
        }
        state.algorithm.evolve(&mut state.population)?;
        if let Some(host) = archipelago {
            let mut view = IslandView { id, state: &mut *state };
            host.post_evolution(&mut view);
        }
        rounds += 1;
        if let Some(flag) = stop {
            if flag.load(Ordering::Relaxed) {
                log::debug!("island {id}: evolution interrupted after {rounds} rounds");
                return Ok(());
            }
        }
        if let WorkerMode::Timed(budget) = mode {
            if started.elapsed() >= budget {
                break;
            }
        }
    }
    Ok(())
}

/// Fold a run's wall-clock time into the island's counter. The clock
/// is monotonic, so deltas are never negative; the add saturates.
fn accumulate_elapsed(state: &mut IslandState, started: Instant) {
    let ms = started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64;
    state.evo_time_ms = state.evo_time_ms.saturating_add(ms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Sade;
    use crate::migration::{BestSelection, FairReplacement, MigrationRate};
    use crate::problem::Sphere;
    use std::sync::atomic::AtomicUsize;

    fn quick_sade(gens: usize) -> Sade {
        Sade::new(gens, 2, 0, 0.0, 0.0, false).unwrap().with_seed(99)
    }

    fn test_island(size: usize, gens: usize) -> Island {
        Island::with_seed(
            &Sphere::new(5),
            &quick_sade(gens),
            size,
            0.5,
            &BestSelection::new(MigrationRate::Absolute(1)),
            &FairReplacement::new(MigrationRate::Absolute(1)),
            7,
        )
        .unwrap()
    }

    /// Sphere that refuses to leave its thread.
    #[derive(Clone)]
    struct BlockingSphere(Sphere);

    impl Problem for BlockingSphere {
        fn dimension(&self) -> usize {
            self.0.dimension()
        }
        fn bounds(&self) -> (&[f64], &[f64]) {
            self.0.bounds()
        }
        fn objfun(&self, x: &[f64]) -> Vec<f64> {
            self.0.objfun(x)
        }
        fn is_blocking(&self) -> bool {
            true
        }
        fn name(&self) -> String {
            "BlockingSphere".to_string()
        }
        fn clone_box(&self) -> Box<dyn Problem> {
            Box::new(self.clone())
        }
    }

    /// Sphere slowed down enough to interrupt reliably.
    #[derive(Clone)]
    struct SlowSphere(Sphere);

    impl Problem for SlowSphere {
        fn dimension(&self) -> usize {
            self.0.dimension()
        }
        fn bounds(&self) -> (&[f64], &[f64]) {
            self.0.bounds()
        }
        fn objfun(&self, x: &[f64]) -> Vec<f64> {
            thread::sleep(Duration::from_micros(200));
            self.0.objfun(x)
        }
        fn name(&self) -> String {
            "SlowSphere".to_string()
        }
        fn clone_box(&self) -> Box<dyn Problem> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_constructor_rejects_bad_migration_probability() {
        let err = Island::new(
            &Sphere::new(3),
            &quick_sade(1),
            10,
            1.5,
            &BestSelection::default(),
            &FairReplacement::default(),
        )
        .unwrap_err();
        assert_eq!(err, ParameterError::MigrationProbability(1.5));

        assert!(Island::new(
            &Sphere::new(3),
            &quick_sade(1),
            10,
            0.0,
            &BestSelection::default(),
            &FairReplacement::default(),
        )
        .is_ok());
    }

    #[test]
    fn test_join_on_idle_island_is_a_no_op() {
        let mut island = test_island(10, 1);
        island.join();
        island.join();
        assert!(!island.busy());
    }

    #[test]
    fn test_evolve_improves_champion() {
        let mut island = test_island(15, 50);
        let before = island.population().champion().unwrap().f[0];
        island.evolve(1).unwrap();
        island.join();
        let after = island.population().champion().unwrap().f[0];
        assert!(after <= before);
        assert!(!island.busy());
    }

    #[test]
    fn test_evolve_zero_is_a_no_op() {
        let mut island = test_island(10, 10);
        let before = island.population();
        let time_before = island.evolution_time();
        island.evolve(0).unwrap();
        island.join();
        let after = island.population();
        assert_eq!(before.individuals(), after.individuals());
        assert_eq!(before.champion(), after.champion());
        assert!(island.evolution_time() <= time_before + 1);
    }

    #[test]
    fn test_blocking_island_evolves_inline() {
        let mut island = Island::with_seed(
            &BlockingSphere(Sphere::new(5)),
            &quick_sade(0),
            10,
            0.0,
            &BestSelection::default(),
            &FairReplacement::default(),
            13,
        )
        .unwrap();
        assert!(island.is_blocking());

        // a zero-generation blocking run: nothing changes, no worker
        let champ_before = island.population().champion().cloned();
        let time_before = island.evolution_time();
        island.evolve(1).unwrap();
        assert!(!island.busy());
        assert_eq!(island.population().champion().cloned(), champ_before);
        assert!(island.evolution_time() <= time_before + 1);
    }

    #[test]
    fn test_blocking_island_propagates_evolve_errors() {
        // population of 7 is below the algorithm's minimum
        let mut island = Island::with_seed(
            &BlockingSphere(Sphere::new(5)),
            &quick_sade(5),
            7,
            0.0,
            &BestSelection::default(),
            &FairReplacement::default(),
            13,
        )
        .unwrap();
        let err = island.evolve(1).unwrap_err();
        assert!(matches!(
            err,
            IslandError::Evolve(EvolveError::PopulationTooSmall(7))
        ));
        // the island is intact and idle afterwards
        assert!(!island.busy());
        assert_eq!(island.size(), 7);
    }

    #[test]
    fn test_nonblocking_worker_error_leaves_island_idle() {
        // same shape error, but on a worker thread: logged, not raised
        let mut island = Island::with_seed(
            &Sphere::new(5),
            &quick_sade(5),
            7,
            0.0,
            &BestSelection::default(),
            &FairReplacement::default(),
            13,
        )
        .unwrap();
        island.evolve(1).unwrap();
        island.join();
        assert!(!island.busy());
        assert_eq!(island.size(), 7);
        island.evolve(3).unwrap();
        island.join();
        assert!(!island.busy());
    }

    #[test]
    fn test_interrupt_then_recover() {
        let mut island = Island::with_seed(
            &SlowSphere(Sphere::new(5)),
            &quick_sade(2),
            10,
            0.0,
            &BestSelection::default(),
            &FairReplacement::default(),
            21,
        )
        .unwrap();

        island.evolve(100).unwrap();
        let err = island.interrupt().unwrap_err();
        assert!(matches!(err, IslandError::Interrupted));
        island.join();
        assert!(!island.busy());

        // a subsequent evolution completes normally
        island.evolve(2).unwrap();
        island.join();
        assert!(!island.busy());
    }

    #[test]
    fn test_interrupt_on_idle_island_is_a_no_op() {
        let mut island = test_island(10, 1);
        assert!(island.interrupt().is_ok());
    }

    #[test]
    fn test_evolution_time_is_monotonic() {
        let mut island = Island::with_seed(
            &SlowSphere(Sphere::new(5)),
            &quick_sade(3),
            10,
            0.0,
            &BestSelection::default(),
            &FairReplacement::default(),
            31,
        )
        .unwrap();
        let t0 = island.evolution_time();
        island.evolve(2).unwrap();
        let t1 = island.evolution_time();
        island.evolve(2).unwrap();
        let t2 = island.evolution_time();
        assert!(t0 <= t1 && t1 <= t2);
    }

    #[test]
    fn test_evolve_t_runs_at_least_once() {
        let mut island = test_island(10, 5);
        let before = island.population();
        island.evolve_t(0).unwrap();
        island.join();
        let after = island.population();
        assert_ne!(before.individuals(), after.individuals());
    }

    #[test]
    fn test_accessor_clones_are_independent() {
        let mut island = test_island(10, 1);
        let champ_before = island.population().champion().cloned();

        let mut pop = island.population();
        pop.set_x(0, vec![0.0; 5]);
        assert_eq!(island.population().champion().cloned(), champ_before);

        let mut algo = island.algorithm();
        let mut scratch = island.population();
        algo.evolve(&mut scratch).unwrap();
        assert_eq!(island.population().champion().cloned(), champ_before);
    }

    #[test]
    fn test_set_algorithm_deep_copies() {
        let mut island = test_island(10, 1);
        let replacement = Sade::new(3, 7, 1, 0.0, 0.0, false).unwrap().with_seed(5);
        island.set_algorithm(&replacement);
        let got = island.algorithm();
        assert!(got.extra_info().contains("variant:7"));
    }

    #[test]
    fn test_accessors_report_the_configured_parts() {
        let mut island = test_island(10, 1);
        assert_eq!(island.problem().name(), "Sphere");
        assert_eq!(island.migration_probability(), 0.5);
        assert!(island.selection_policy().name().contains("Best selection"));
        assert!(island
            .replacement_policy()
            .name()
            .contains("Fair replacement"));
        assert_eq!(island.size(), 10);
        assert!(!island.is_blocking());
    }

    #[test]
    fn test_twin_islands_with_identical_seeds_stay_identical() {
        let mut a = Island::with_seed(
            &Sphere::new(5),
            &quick_sade(10),
            16,
            0.0,
            &BestSelection::default(),
            &FairReplacement::default(),
            42,
        )
        .unwrap();
        let mut b = Island::with_seed(
            &Sphere::new(5),
            &quick_sade(10),
            16,
            0.0,
            &BestSelection::default(),
            &FairReplacement::default(),
            42,
        )
        .unwrap();

        a.evolve(3).unwrap();
        b.evolve(3).unwrap();
        let pop_a = a.population();
        let pop_b = b.population();
        assert_eq!(pop_a.individuals(), pop_b.individuals());
        assert_eq!(pop_a.champion(), pop_b.champion());
    }

    #[test]
    fn test_migration_surface() {
        let mut island = test_island(10, 1);
        let emigrants = island.emigrants();
        assert_eq!(emigrants.len(), 1);

        let best = island.population().champion().unwrap().f.clone();
        assert_eq!(emigrants[0].cur_f, best);

        let immigrant = Individual::new(vec![0.0; 5], vec![0.0]);
        island.accept_immigrants(&[immigrant]);
        assert_eq!(island.population().champion().unwrap().f, vec![0.0]);
    }

    #[test]
    fn test_reports_mention_all_parts() {
        let mut island = test_island(5, 1);
        let terse = island.human_readable_terse();
        assert!(terse.contains("Self-adaptive Differential Evolution"));
        assert!(terse.contains("Migration probability: 50%"));
        assert!(terse.contains("Best selection"));
        assert!(terse.contains("Fair replacement"));
        assert!(terse.contains("Sphere"));

        let full = island.human_readable();
        assert!(full.contains("#0"));
        assert!(full.contains("#4"));
    }

    /// Host that counts hook invocations and loops emigrants straight
    /// back as immigrants.
    struct LoopbackHost {
        pre_calls: AtomicUsize,
        post_calls: AtomicUsize,
        barrier_calls: AtomicUsize,
        queue: Mutex<Vec<Individual>>,
    }

    impl LoopbackHost {
        fn new() -> Self {
            Self {
                pre_calls: AtomicUsize::new(0),
                post_calls: AtomicUsize::new(0),
                barrier_calls: AtomicUsize::new(0),
                queue: Mutex::new(Vec::new()),
            }
        }
    }

    impl Archipelago for LoopbackHost {
        fn sync_island_start(&self) {
            self.barrier_calls.fetch_add(1, Ordering::SeqCst);
        }

        fn pre_evolution(&self, island: &mut IslandView<'_>) {
            self.pre_calls.fetch_add(1, Ordering::SeqCst);
            let queued: Vec<Individual> = self.queue.lock().unwrap().drain(..).collect();
            if !queued.is_empty() {
                island.accept_immigrants(&queued);
            }
        }

        fn post_evolution(&self, island: &mut IslandView<'_>) {
            self.post_calls.fetch_add(1, Ordering::SeqCst);
            let emigrants = island.emigrants();
            self.queue.lock().unwrap().extend(emigrants);
        }
    }

    #[test]
    fn test_archipelago_hooks_bracket_every_round() {
        let host = Arc::new(LoopbackHost::new());
        let mut island = test_island(10, 1);
        island.attach(Arc::clone(&host) as Arc<dyn Archipelago>);

        island.evolve(4).unwrap();
        island.join();

        assert_eq!(host.barrier_calls.load(Ordering::SeqCst), 1);
        assert_eq!(host.pre_calls.load(Ordering::SeqCst), 4);
        assert_eq!(host.post_calls.load(Ordering::SeqCst), 4);
        // the last round's emigrant is still queued
        assert_eq!(host.queue.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_detached_island_skips_hooks() {
        let host = Arc::new(LoopbackHost::new());
        let mut island = test_island(10, 1);
        island.attach(Arc::clone(&host) as Arc<dyn Archipelago>);
        island.detach();

        island.evolve(2).unwrap();
        island.join();
        assert_eq!(host.pre_calls.load(Ordering::SeqCst), 0);
        assert_eq!(host.barrier_calls.load(Ordering::SeqCst), 0);
    }
}
