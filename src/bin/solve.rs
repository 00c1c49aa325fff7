//! Command-line front end: solve a named game with one algorithm, or compare
//! every algorithm on it.
//!
//! Usage:
//!   cargo run --release --bin solve -- --game kuhn --algo pdcfr+ --iterations 1000
//!   cargo run --release --bin solve -- --game leduc --compare --iterations 500 --eval-interval 50

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use regret_solver::cfr::{Algorithm, CFRSolver, Game, SolverConfig, UpdateRule};
use regret_solver::games::coin_guess::CoinGuess;
use regret_solver::games::kuhn::KuhnPoker;
use regret_solver::games::leduc::LeducPoker;
use regret_solver::metrics::{CsvWriter, LogWriter, Logger};
use regret_solver::runner::{compare, summary_table, GameKind};

#[derive(Parser, Debug)]
#[command(name = "solve")]
#[command(about = "Solve small extensive-form games with the CFR family")]
struct Cli {
    /// Game to solve: kuhn, leduc or coin-guess
    #[arg(short, long, default_value = "kuhn")]
    game: GameKind,

    /// Algorithm: cfr, cfr+, linear-cfr, dcfr, dcfr+, pcfr+ or pdcfr+ [default: cfr]
    #[arg(short, long)]
    algo: Option<Algorithm>,

    /// JSON solver configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of iterations
    #[arg(short, long)]
    iterations: Option<u64>,

    /// Evaluate exploitability every N iterations
    #[arg(long)]
    eval_interval: Option<u64>,

    /// Positive regret discount exponent
    #[arg(long)]
    alpha: Option<f64>,

    /// Negative regret discount exponent
    #[arg(long)]
    beta: Option<f64>,

    /// Average strategy discount exponent
    #[arg(long)]
    gamma: Option<f64>,

    /// Player traversal order, e.g. `1,0`
    #[arg(long, value_delimiter = ',')]
    player_order: Option<Vec<usize>>,

    /// Write metrics to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Save a JSON checkpoint here when done
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Resume from a JSON checkpoint
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Run every algorithm in parallel and print a summary
    #[arg(long)]
    compare: bool,
}

impl Cli {
    fn solver_config(&self) -> Result<SolverConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::from_json_file(path)?,
            None => SolverConfig::new(self.algo.unwrap_or(Algorithm::Cfr)),
        };
        if let Some(algo) = self.algo {
            if algo != config.rule.algorithm {
                config = config.with_rule(UpdateRule::new(algo));
            }
        }
        if let Some(alpha) = self.alpha {
            config = config.with_alpha(alpha);
        }
        if let Some(beta) = self.beta {
            config = config.with_beta(beta);
        }
        if let Some(gamma) = self.gamma {
            config = config.with_gamma(gamma);
        }
        if let Some(iterations) = self.iterations {
            config = config.with_iterations(iterations);
        }
        if let Some(interval) = self.eval_interval {
            config = config.with_eval_interval(interval);
        }
        if let Some(order) = &self.player_order {
            config = config.with_player_order(order.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = cli.solver_config()?;

    if cli.compare {
        let results = compare(cli.game, &Algorithm::ALL, &config)?;
        println!("\n{} after {} iterations\n", cli.game, config.iterations);
        print!("{}", summary_table(&results));
        return Ok(());
    }

    match cli.game {
        GameKind::Kuhn => solve(KuhnPoker::new(), &cli, config),
        GameKind::Leduc => solve(LeducPoker::new(), &cli, config),
        GameKind::CoinGuess => solve(CoinGuess::new(), &cli, config),
    }
}

fn solve<G: Game>(game: G, cli: &Cli, config: SolverConfig) -> Result<(), Box<dyn Error>> {
    let iterations = config.iterations;
    let algorithm = config.rule.algorithm;

    let mut metrics = Logger::new().with_writer(LogWriter::with_prefix(algorithm.name()));
    if let Some(path) = &cli.csv {
        metrics.add_writer(Box::new(CsvWriter::create(path)?));
    }
    let mut solver = CFRSolver::new(game, config)?.with_metrics(metrics);

    if let Some(path) = &cli.resume {
        solver.load_checkpoint(path)?;
    }

    let bar = ProgressBar::new(iterations);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    bar.set_position(solver.iteration());

    let stats = solver.learn_with_callback(|stats| {
        bar.set_position(stats.iterations);
        if let Some(exp) = stats.exploitability {
            bar.set_message(format!("exp {:.3e}", exp));
        }
    })?;
    bar.finish();

    println!(
        "\n{} on {}: {} iterations, {} info sets, {:.2}s ({:.0} it/s)",
        algorithm,
        cli.game,
        stats.iterations,
        stats.info_sets,
        stats.elapsed_seconds,
        stats.iterations_per_second
    );
    if let Some(exp) = stats.exploitability {
        println!("Final exploitability: {:.6e}", exp);
    }

    if let Some(path) = &cli.checkpoint {
        solver.save_checkpoint(path)?;
    }
    Ok(())
}
