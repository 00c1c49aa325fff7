//! Debug script for Kuhn Poker: watch one variant's average strategy settle.
//!
//! Usage: cargo run --release --example debug_kuhn -- [algorithm]

use regret_solver::cfr::{Algorithm, CFRSolver, SolverConfig};
use regret_solver::games::kuhn::KuhnPoker;
use regret_solver::metrics::Logger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let algorithm: Algorithm = match std::env::args().nth(1) {
        Some(name) => name.parse()?,
        None => Algorithm::Cfr,
    };
    let mut solver = CFRSolver::new(KuhnPoker::new(), SolverConfig::new(algorithm))?
        .with_metrics(Logger::new());

    let avg = |solver: &CFRSolver<KuhnPoker>, key: &str| {
        solver.get_average_strategy(key).unwrap_or_else(|| vec![f64::NAN; 2])
    };

    for i in 1..=10 {
        solver.train(1_000);
        let exploit = solver.evaluate()?;

        println!("{} after {} iterations (exploitability {:.2e}):", algorithm, i * 1_000, exploit);
        for (name, card) in [("Jack", 0), ("Queen", 1), ("King", 2)] {
            let root = avg(&solver, &format!("{}:/0", card));
            let vs_bet = avg(&solver, &format!("{}:b/1", card));
            println!(
                "  {:<5} P1 root: Pass={:.3}, Bet={:.3}   P2 facing bet: Fold={:.3}, Call={:.3}",
                name, root[0], root[1], vs_bet[0], vs_bet[1]
            );
        }
        println!();
    }

    println!("Total info sets: {}", solver.num_info_sets());

    println!("\nExpected Nash equilibrium (alpha in [0, 1/3]):");
    println!("  P1 Jack:  Bet=alpha");
    println!("  P1 Queen: Pass=1.000");
    println!("  P1 King:  Bet=3*alpha");
    println!("  P2 Jack vs bet:  Fold=1.000");
    println!("  P2 Queen vs bet: Call=0.333");
    println!("  P2 King vs bet:  Call=1.000");
    Ok(())
}
