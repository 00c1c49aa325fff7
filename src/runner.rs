//! Experiment runner.
//!
//! Picks a game by name, runs one solver to completion, and collects what a
//! comparison between algorithms needs. [`compare`] runs one independent
//! solver per algorithm on the rayon pool.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::cfr::{
    Algorithm, CFRSolver, ConfigError, ExploitabilityPoint, Game, SolverConfig, UpdateRule,
};
use crate::error::Result;
use crate::games::coin_guess::CoinGuess;
use crate::games::kuhn::KuhnPoker;
use crate::games::leduc::LeducPoker;
use crate::metrics::{LogWriter, Logger, MetricsWriter};

/// Games the runner knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GameKind {
    /// Kuhn poker.
    Kuhn,
    /// Leduc hold'em.
    Leduc,
    /// Single-player coin guess.
    CoinGuess,
}

impl GameKind {
    /// Every registered game.
    pub const ALL: [GameKind; 3] = [GameKind::Kuhn, GameKind::Leduc, GameKind::CoinGuess];

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            GameKind::Kuhn => "kuhn",
            GameKind::Leduc => "leduc",
            GameKind::CoinGuess => "coin-guess",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "kuhn" | "kuhn-poker" => Ok(GameKind::Kuhn),
            "leduc" | "leduc-poker" => Ok(GameKind::Leduc),
            "coin-guess" | "coin" => Ok(GameKind::CoinGuess),
            _ => Err(ConfigError::UnknownGame(s.to_string())),
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentResult {
    /// Game played.
    pub game: GameKind,
    /// Algorithm used.
    pub algorithm: Algorithm,
    /// Exploitability at the last evaluation.
    pub final_exploitability: f64,
    /// Every evaluation.
    pub history: Vec<ExploitabilityPoint>,
    /// Wall time including enumeration.
    pub elapsed_seconds: f64,
    /// Information sets in the game.
    pub info_sets: usize,
}

/// Run `config` on `kind` to completion, writing metrics to `writers`.
pub fn run_experiment(
    kind: GameKind,
    config: SolverConfig,
    writers: Vec<Box<dyn MetricsWriter>>,
) -> Result<ExperimentResult> {
    run_experiment_with_callback(kind, config, writers, |_| {})
}

/// [`run_experiment`], calling `callback` with the iteration count after
/// every evaluation.
pub fn run_experiment_with_callback<F>(
    kind: GameKind,
    config: SolverConfig,
    writers: Vec<Box<dyn MetricsWriter>>,
    callback: F,
) -> Result<ExperimentResult>
where
    F: FnMut(u64),
{
    let mut logger = Logger::new();
    for writer in writers {
        logger.add_writer(writer);
    }
    match kind {
        GameKind::Kuhn => run_game(KuhnPoker::new(), kind, config, logger, callback),
        GameKind::Leduc => run_game(LeducPoker::new(), kind, config, logger, callback),
        GameKind::CoinGuess => run_game(CoinGuess::new(), kind, config, logger, callback),
    }
}

fn run_game<G, F>(
    game: G,
    kind: GameKind,
    config: SolverConfig,
    logger: Logger,
    mut callback: F,
) -> Result<ExperimentResult>
where
    G: Game,
    F: FnMut(u64),
{
    let start = Instant::now();
    let algorithm = config.rule.algorithm;
    let mut solver = CFRSolver::new(game, config)?.with_metrics(logger);
    let stats = solver.learn_with_callback(|stats| callback(stats.iterations))?;

    Ok(ExperimentResult {
        game: kind,
        algorithm,
        final_exploitability: stats.exploitability.unwrap_or(f64::NAN),
        history: stats.exploitability_history.clone(),
        elapsed_seconds: start.elapsed().as_secs_f64(),
        info_sets: stats.info_sets,
    })
}

/// Run every algorithm in `algorithms` on `kind`, in parallel.
///
/// Each run uses `base` with the algorithm's default rule and logs through
/// the `log` facade, tagged with the algorithm name. Results come back in
/// the order of `algorithms`.
pub fn compare(
    kind: GameKind,
    algorithms: &[Algorithm],
    base: &SolverConfig,
) -> Result<Vec<ExperimentResult>> {
    algorithms
        .par_iter()
        .map(|&algorithm| {
            let config = base.clone().with_rule(UpdateRule::new(algorithm));
            let writers: Vec<Box<dyn MetricsWriter>> =
                vec![Box::new(LogWriter::with_prefix(algorithm.name()))];
            run_experiment(kind, config, writers)
        })
        .collect()
}

/// Plain-text table of results, best first.
pub fn summary_table(results: &[ExperimentResult]) -> String {
    let mut sorted: Vec<&ExperimentResult> = results.iter().collect();
    sorted.sort_by(|a, b| a.final_exploitability.total_cmp(&b.final_exploitability));

    let mut out = format!(
        "{:<10} {:>10} {:>16} {:>10}\n",
        "algorithm", "iters", "exploitability", "seconds"
    );
    for r in sorted {
        let iters = r.history.last().map_or(0, |p| p.iteration);
        out.push_str(&format!(
            "{:<10} {:>10} {:>16.6e} {:>10.2}\n",
            r.algorithm.name(),
            iters,
            r.final_exploitability,
            r.elapsed_seconds
        ));
    }
    out
}
