//! Counterfactual Regret Minimization solver.
//!
//! The solver enumerates the game once, then runs full-width iterations on
//! the materialized tree. Each iteration visits the players in a fixed order;
//! for every player it clears the temporaries of that player's information
//! sets, traverses the tree, and immediately applies the update rule, so the
//! next player's traversal already sees the new policy.
//!
//! All seven update rules of [`Algorithm`](crate::cfr::Algorithm) share this
//! driver; only the [`UpdateRule`] value differs.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::cfr::config::{CFRStats, SolverConfig};
use crate::cfr::exploitability::{BestResponse, Exploitability};
use crate::cfr::game::{Game, InfoState};
use crate::cfr::infoset::InfoSet;
use crate::cfr::storage::{InfoSetStore, StorageExport};
use crate::cfr::traversal::traverse;
use crate::cfr::tree::{build_all, GameTree};
use crate::cfr::variant::UpdateRule;
use crate::error::{Result, SolverError};
use crate::metrics::Logger;

/// Where the iteration driver currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverPhase {
    /// Between iterations.
    Idle,
    /// Running the traversal for a player.
    Traversing(usize),
    /// Applying the update rule to a player's information sets.
    Updating(usize),
}

/// The main CFR solver.
///
/// This struct manages the CFR algorithm for any game implementing the `Game` trait.
/// It owns the enumerated tree and every information set, and it handles
/// regret accumulation, strategy computation and periodic evaluation.
///
/// # Type Parameters
/// - `G`: The game type implementing the `Game` trait
///
/// # Example
/// ```
/// use regret_solver::cfr::{Algorithm, CFRSolver, SolverConfig};
/// use regret_solver::games::kuhn::KuhnPoker;
///
/// let config = SolverConfig::new(Algorithm::CfrPlus).with_iterations(200);
/// let mut solver = CFRSolver::new(KuhnPoker::new(), config).unwrap();
/// solver.train(200);
///
/// // Queen never opens with a bet.
/// let queen = solver.get_average_strategy("1:/0").unwrap();
/// assert!(queen[0] > 0.9);
/// ```
pub struct CFRSolver<G: Game> {
    /// The game being solved.
    game: G,

    /// Configuration for the solver.
    config: SolverConfig,

    /// Tree materialized at construction.
    tree: GameTree,

    /// Every information set of the game.
    store: InfoSetStore<G::Action>,

    /// Resolved traversal order.
    player_order: Vec<usize>,

    /// Current iteration count.
    iteration: u64,

    /// Driver state.
    phase: DriverPhase,

    /// Statistics tracking.
    stats: CFRStats,

    /// Scores the average policy.
    oracle: Box<dyn Exploitability<G>>,

    /// Receives `exp` and `iter` at every evaluation.
    metrics: Logger,
}

impl<G: Game> std::fmt::Debug for CFRSolver<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CFRSolver")
            .field("config", &self.config)
            .field("iteration", &self.iteration)
            .field("phase", &self.phase)
            .field("info_sets", &self.store.len())
            .finish()
    }
}

impl<G: Game> CFRSolver<G> {
    /// Create a new CFR solver for the given game.
    ///
    /// Validates the configuration and enumerates the whole game tree. The
    /// default oracle is [`BestResponse`] and metrics go to the `log` facade.
    ///
    /// # Arguments
    /// * `game` - The game to solve
    /// * `config` - Configuration options for the solver
    pub fn new(game: G, config: SolverConfig) -> Result<Self> {
        Self::with_oracle(game, config, BestResponse::new())
    }

    /// Create a solver that evaluates with `oracle`.
    pub fn with_oracle<O>(game: G, config: SolverConfig, oracle: O) -> Result<Self>
    where
        O: Exploitability<G> + 'static,
    {
        config.validate()?;
        let player_order = config.resolve_player_order(game.num_players())?;
        let (tree, store) = build_all(&game, config.max_tree_nodes)?;

        let mut stats = CFRStats::new();
        stats.info_sets = store.len();

        log::info!(
            "{} solver ready: {} info sets, player order {:?}",
            config.rule.algorithm,
            store.len(),
            player_order
        );

        Ok(Self {
            game,
            config,
            tree,
            store,
            player_order,
            iteration: 0,
            phase: DriverPhase::Idle,
            stats,
            oracle: Box::new(oracle),
            metrics: Logger::stdout(),
        })
    }

    /// Builder method: replace the metrics logger.
    pub fn with_metrics(mut self, metrics: Logger) -> Self {
        self.metrics = metrics;
        self
    }

    /// Mutable access to the metrics logger, e.g. to attach writers.
    pub fn metrics_mut(&mut self) -> &mut Logger {
        &mut self.metrics
    }

    /// Run a single iteration.
    ///
    /// Increments `T`, then for every player in order: clear, traverse,
    /// update.
    pub fn run_iteration(&mut self) {
        self.iteration += 1;
        let t = self.iteration;

        for i in 0..self.player_order.len() {
            let player = self.player_order[i];
            self.begin_traversal(player);
            self.phase = DriverPhase::Traversing(player);
            traverse(&self.tree, &mut self.store, self.tree.root(), player, 1.0, 1.0);
            self.phase = DriverPhase::Updating(player);
            let rule = self.config.rule;
            self.store.for_each_owned(player, |s| rule.apply(s, t));
        }

        self.phase = DriverPhase::Idle;
        log::debug!("iteration {} complete", t);
    }

    /// Zero the temporaries of `player`'s information sets.
    fn begin_traversal(&mut self, player: usize) {
        self.store.for_each_owned(player, InfoSet::clear_temp);
    }

    /// Train the solver for a specified number of iterations, without
    /// evaluating.
    ///
    /// # Arguments
    /// * `iterations` - Number of iterations to run
    ///
    /// # Returns
    /// Statistics from the training run.
    pub fn train(&mut self, iterations: u64) -> &CFRStats {
        let start_time = Instant::now();
        let base = self.stats.elapsed_seconds;

        for _ in 0..iterations {
            self.run_iteration();
        }

        self.update_stats(base + start_time.elapsed().as_secs_f64());
        &self.stats
    }

    /// Run the configured number of iterations with periodic evaluation.
    ///
    /// Evaluates before the first iteration, then whenever `T` is a multiple
    /// of `eval_interval`, and stops once `T` reaches `iterations`.
    pub fn learn(&mut self) -> Result<&CFRStats> {
        self.learn_with_callback(|_| {})
    }

    /// [`learn`](Self::learn), calling `callback` after every evaluation.
    pub fn learn_with_callback<F>(&mut self, mut callback: F) -> Result<&CFRStats>
    where
        F: FnMut(&CFRStats),
    {
        let start_time = Instant::now();
        let base = self.stats.elapsed_seconds;

        let evaluated_now = self
            .stats
            .exploitability_history
            .last()
            .map_or(false, |p| p.iteration == self.iteration);
        if !evaluated_now {
            self.evaluate()?;
            self.update_stats(base + start_time.elapsed().as_secs_f64());
            callback(&self.stats);
        }

        while self.iteration < self.config.iterations {
            self.run_iteration();
            if self.iteration % self.config.eval_interval == 0 {
                self.evaluate()?;
                self.update_stats(base + start_time.elapsed().as_secs_f64());
                callback(&self.stats);
            }
        }

        self.update_stats(base + start_time.elapsed().as_secs_f64());
        self.metrics.close()?;
        log::info!(
            "{} finished {} iterations in {:.2}s, exploitability {:?}",
            self.config.rule.algorithm,
            self.iteration,
            self.stats.elapsed_seconds,
            self.stats.exploitability
        );
        Ok(&self.stats)
    }

    /// Score the current average policy with the oracle.
    ///
    /// The result is clamped to `exploitability_floor`, recorded in the stats
    /// history and flushed to the metrics logger at step `T`.
    pub fn evaluate(&mut self) -> Result<f64> {
        let raw = {
            let policy = |state: &G::State| self.average_policy_for_state(state);
            self.oracle.exploitability(&self.game, &policy)?
        };
        let exploitability = raw.max(self.config.exploitability_floor);

        self.stats.record_exploitability(self.iteration, exploitability);
        self.metrics.record("exp", exploitability);
        self.metrics.record("iter", self.iteration);
        self.metrics.dump(self.iteration)?;
        Ok(exploitability)
    }

    fn update_stats(&mut self, elapsed_seconds: f64) {
        self.stats.iterations = self.iteration;
        self.stats.info_sets = self.store.len();
        self.stats.elapsed_seconds = elapsed_seconds;
        self.stats.update_rate();
    }

    /// Average policy of the player acting at `state`.
    ///
    /// Fails with [`SolverError::UnknownInfoSet`] if enumeration never saw
    /// the state's information set.
    pub fn average_policy_for_state(&self, state: &G::State) -> Result<Vec<f64>> {
        let player = self.game.current_player(state).ok_or_else(|| {
            SolverError::InvalidState(format!(
                "no acting player at {}",
                self.game.state_description(state)
            ))
        })?;
        let key = InfoSetStore::<G::Action>::compose_key(
            &self.game.info_state(state, player).key(),
            player,
        );
        self.store
            .by_key(&key)
            .map(InfoSet::average_policy)
            .ok_or_else(|| SolverError::UnknownInfoSet(key))
    }

    /// Get the current strategy for an information set.
    ///
    /// `key` is the composite key, e.g. `"1:b/1"`.
    pub fn get_current_strategy(&self, key: &str) -> Option<Vec<f64>> {
        self.store.by_key(key).map(|s| s.policy().to_vec())
    }

    /// Get the average strategy for an information set.
    ///
    /// This returns the time-averaged strategy which converges to Nash equilibrium.
    pub fn get_average_strategy(&self, key: &str) -> Option<Vec<f64>> {
        self.store.by_key(key).map(InfoSet::average_policy)
    }

    /// Get the current iteration count.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Driver state.
    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    /// Get the number of information sets.
    pub fn num_info_sets(&self) -> usize {
        self.store.len()
    }

    /// Get all information set keys, in creation order.
    pub fn info_set_keys(&self) -> Vec<String> {
        self.store.iter().map(|s| s.key().to_string()).collect()
    }

    /// Get current statistics.
    pub fn stats(&self) -> &CFRStats {
        &self.stats
    }

    /// Get reference to the information sets.
    pub fn store(&self) -> &InfoSetStore<G::Action> {
        &self.store
    }

    /// Get reference to the enumerated tree.
    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    /// Get reference to the game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Traversal order in use.
    pub fn player_order(&self) -> &[usize] {
        &self.player_order
    }

    /// Export solver state for checkpointing.
    pub fn export_state(&self) -> SolverState {
        SolverState {
            iteration: self.iteration,
            rule: self.config.rule,
            storage: self.store.export(),
            stats: self.stats.clone(),
        }
    }

    /// Import solver state from checkpoint.
    ///
    /// The checkpoint must come from the same game and algorithm.
    pub fn import_state(&mut self, state: SolverState) -> Result<()> {
        if state.rule.algorithm != self.config.rule.algorithm {
            return Err(SolverError::CheckpointMismatch(format!(
                "checkpoint was written by {}, solver runs {}",
                state.rule.algorithm, self.config.rule.algorithm
            )));
        }
        if state.rule != self.config.rule {
            log::warn!(
                "checkpoint parameters {:?} differ from configured {:?}; keeping the configured ones",
                state.rule,
                self.config.rule
            );
        }
        self.store.import(&state.storage)?;
        self.iteration = state.iteration;
        self.stats = state.stats;
        self.phase = DriverPhase::Idle;
        Ok(())
    }

    /// Write [`export_state`](Self::export_state) as JSON.
    pub fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &self.export_state())?;
        log::info!("saved checkpoint at iteration {} to {}", self.iteration, path.display());
        Ok(())
    }

    /// Restore a checkpoint written by [`save_checkpoint`](Self::save_checkpoint).
    pub fn load_checkpoint<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let state: SolverState = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        self.import_state(state)?;
        log::info!("loaded checkpoint at iteration {} from {}", self.iteration, path.display());
        Ok(())
    }

    /// Reset the solver to initial state.
    pub fn reset(&mut self) {
        self.store.reset();
        self.iteration = 0;
        self.phase = DriverPhase::Idle;
        self.stats = CFRStats::new();
        self.stats.info_sets = self.store.len();
    }
}

/// Serializable solver state for checkpointing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverState {
    /// Current iteration.
    pub iteration: u64,
    /// Update rule that produced the accumulators.
    pub rule: UpdateRule,
    /// Storage export.
    pub storage: StorageExport,
    /// Statistics.
    pub stats: CFRStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::variant::Algorithm;
    use crate::games::kuhn::KuhnPoker;
    use crate::metrics::MemoryWriter;

    fn kuhn(algorithm: Algorithm) -> CFRSolver<KuhnPoker> {
        CFRSolver::new(KuhnPoker::new(), SolverConfig::new(algorithm))
            .unwrap()
            .with_metrics(Logger::new())
    }

    #[test]
    fn test_new_solver_is_uniform() {
        let solver = kuhn(Algorithm::Cfr);
        assert_eq!(solver.num_info_sets(), 12);
        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.phase(), DriverPhase::Idle);
        for key in solver.info_set_keys() {
            assert_eq!(solver.get_current_strategy(&key).unwrap(), vec![0.5, 0.5]);
        }
        assert!(solver.get_average_strategy("missing/0").is_none());
    }

    #[test]
    fn test_iteration_counter_and_phase() {
        let mut solver = kuhn(Algorithm::CfrPlus);
        solver.run_iteration();
        solver.run_iteration();
        assert_eq!(solver.iteration(), 2);
        assert_eq!(solver.phase(), DriverPhase::Idle);
        assert_eq!(solver.train(3).iterations, 5);
    }

    #[test]
    fn test_temporaries_are_zero_before_each_traversal() {
        let mut solver = kuhn(Algorithm::Dcfr);
        solver.run_iteration();
        for player in 0..2 {
            let before: Vec<Vec<f64>> = solver
                .store()
                .owned_by(player)
                .iter()
                .map(|&id| solver.store().get(id).imm_regret().to_vec())
                .collect();
            assert!(before.iter().flatten().any(|&r| r != 0.0));

            solver.begin_traversal(player);
            for (&id, old) in solver.store().owned_by(player).iter().zip(&before) {
                let s = solver.store().get(id);
                assert!(s.imm_regret().iter().all(|&r| r == 0.0));
                assert_eq!(s.reach(), 0.0);
                assert_eq!(s.imm_regret_snapshot(), old.as_slice());
            }
        }
    }

    #[test]
    fn test_evaluate_records_metrics() {
        let memory = MemoryWriter::new();
        let mut solver = CFRSolver::new(
            KuhnPoker::new(),
            SolverConfig::vanilla().with_iterations(4).with_eval_interval(2),
        )
        .unwrap()
        .with_metrics(Logger::new().with_writer(memory.clone()));

        let mut seen = Vec::new();
        solver
            .learn_with_callback(|stats| seen.push(stats.iterations))
            .unwrap();

        assert_eq!(seen, vec![0, 2, 4]);
        let steps: Vec<u64> = memory.series("exp").iter().map(|&(s, _)| s).collect();
        assert_eq!(steps, vec![0, 2, 4]);
        let iters: Vec<u64> = memory.series("iter").iter().map(|&(_, v)| v as u64).collect();
        assert_eq!(iters, vec![0, 2, 4]);

        let first = solver.stats().exploitability_history[0].exploitability;
        assert!((first - 11.0 / 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_exploitability_is_floored() {
        struct Zero;
        impl Exploitability<KuhnPoker> for Zero {
            fn exploitability(
                &self,
                _game: &KuhnPoker,
                _policy: &crate::cfr::exploitability::PolicyFn<'_, KuhnPoker>,
            ) -> Result<f64> {
                Ok(-1.0)
            }
        }
        let mut solver = CFRSolver::with_oracle(KuhnPoker::new(), SolverConfig::vanilla(), Zero)
            .unwrap()
            .with_metrics(Logger::new());
        assert_eq!(solver.evaluate().unwrap(), 1e-12);
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let mut solver = kuhn(Algorithm::PdcfrPlus);
        solver.train(25);
        let state = solver.export_state();

        let mut restored = kuhn(Algorithm::PdcfrPlus);
        restored.import_state(state).unwrap();
        assert_eq!(restored.iteration(), 25);
        for key in solver.info_set_keys() {
            assert_eq!(
                restored.get_average_strategy(&key),
                solver.get_average_strategy(&key)
            );
            assert_eq!(
                restored.get_current_strategy(&key),
                solver.get_current_strategy(&key)
            );
        }

        // Both continue identically.
        solver.train(5);
        restored.train(5);
        for key in solver.info_set_keys() {
            assert_eq!(
                restored.get_current_strategy(&key),
                solver.get_current_strategy(&key)
            );
        }
    }

    #[test]
    fn test_checkpoint_file() {
        let path = std::env::temp_dir().join("regret_solver_checkpoint_test.json");
        let mut solver = kuhn(Algorithm::CfrPlus);
        solver.train(10);
        solver.save_checkpoint(&path).unwrap();

        let mut restored = kuhn(Algorithm::CfrPlus);
        restored.load_checkpoint(&path).unwrap();
        assert_eq!(restored.iteration(), 10);
        for key in solver.info_set_keys() {
            let a = restored.get_average_strategy(&key).unwrap();
            let b = solver.get_average_strategy(&key).unwrap();
            assert!(a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-12), "{}", key);
        }
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_checkpoint_from_other_algorithm_is_rejected() {
        let mut solver = kuhn(Algorithm::Cfr);
        solver.train(2);
        let mut other = kuhn(Algorithm::Dcfr);
        assert!(matches!(
            other.import_state(solver.export_state()),
            Err(SolverError::CheckpointMismatch(_))
        ));
    }

    #[test]
    fn test_reset() {
        let mut solver = kuhn(Algorithm::LinearCfr);
        solver.train(20);
        solver.reset();
        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.stats().info_sets, 12);
        for key in solver.info_set_keys() {
            assert_eq!(solver.get_current_strategy(&key).unwrap(), vec![0.5, 0.5]);
            assert_eq!(solver.get_average_strategy(&key).unwrap(), vec![0.5, 0.5]);
        }
    }

    #[test]
    fn test_average_policy_for_state() {
        let solver = kuhn(Algorithm::Cfr);
        let game = KuhnPoker::new();
        let state = crate::games::kuhn::KuhnState::dealt([2, 0], "b");
        assert_eq!(solver.average_policy_for_state(&state).unwrap(), vec![0.5, 0.5]);
        assert!(matches!(
            solver.average_policy_for_state(&game.initial_state()),
            Err(SolverError::InvalidState(_))
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = CFRSolver::new(KuhnPoker::new(), SolverConfig::vanilla().with_player_order(vec![0]))
            .unwrap_err();
        assert!(matches!(err, SolverError::Config(_)));
    }
}
