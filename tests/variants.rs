//! End-to-end behaviour shared by every update rule.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use regret_solver::cfr::{
    Algorithm, BestResponse, CFRSolver, Exploitability, Game, InfoState, SolverConfig,
};
use regret_solver::games::kuhn::{KuhnPoker, KuhnState};
use regret_solver::games::leduc::LeducPoker;
use regret_solver::metrics::Logger;

fn quiet<G: Game>(game: G, config: SolverConfig) -> CFRSolver<G> {
    CFRSolver::new(game, config)
        .unwrap()
        .with_metrics(Logger::new())
}

#[test]
fn test_every_variant_solves_kuhn() {
    let mut finals = Vec::new();
    for algorithm in Algorithm::ALL {
        let config = SolverConfig::new(algorithm)
            .with_iterations(1000)
            .with_eval_interval(100);
        let mut solver = quiet(KuhnPoker::new(), config);
        let stats = solver.learn().unwrap();

        let curve: Vec<f64> = stats
            .exploitability_history
            .iter()
            .map(|p| p.exploitability)
            .collect();
        assert_eq!(curve.len(), 11);
        assert!((curve[0] - 11.0 / 24.0).abs() < 1e-9, "{}: {}", algorithm, curve[0]);

        // Averages wobble a little but never climb back above twice the
        // best value seen so far.
        let mut best = curve[0];
        for (i, &exp) in curve.iter().enumerate().skip(1) {
            assert!(exp <= 2.0 * best, "{} rose to {} at evaluation {}", algorithm, exp, i);
            best = best.min(exp);
        }

        let last = stats.exploitability.unwrap();
        assert!(last < 0.05, "{} ended at {}", algorithm, last);
        assert!(last < curve[0] / 100.0);
        finals.push((algorithm, last));
    }

    let vanilla = finals[0].1;
    assert_eq!(finals[0].0, Algorithm::Cfr);
    for &(algorithm, last) in &finals[1..] {
        assert!(last < vanilla, "{} ({}) is not ahead of CFR ({})", algorithm, last, vanilla);
    }
}

#[test]
fn test_policies_stay_distributions() {
    for algorithm in Algorithm::ALL {
        let mut solver = quiet(KuhnPoker::new(), SolverConfig::new(algorithm));
        for _ in 0..50 {
            solver.run_iteration();
            for set in solver.store().iter() {
                let current: f64 = set.policy().iter().sum();
                let average: f64 = set.average_policy().iter().sum();
                assert!((current - 1.0).abs() < 1e-9, "{} {}", algorithm, set.key());
                assert!((average - 1.0).abs() < 1e-9, "{} {}", algorithm, set.key());
                assert!(set.policy().iter().all(|&p| p >= 0.0));
            }
        }
    }
}

#[test]
fn test_player_order_matters() {
    let forward = {
        let mut solver = quiet(KuhnPoker::new(), SolverConfig::vanilla());
        solver.run_iteration();
        solver.get_current_strategy("0:/0").unwrap()
    };
    let backward = {
        let config = SolverConfig::vanilla().with_player_order(vec![1, 0]);
        let mut solver = quiet(KuhnPoker::new(), config);
        solver.run_iteration();
        solver.get_current_strategy("0:/0").unwrap()
    };

    // The Jack bets into a uniform opponent and checks against one that
    // updated first.
    assert_eq!(forward, vec![0.0, 1.0]);
    assert_eq!(backward, vec![1.0, 0.0]);
}

#[test]
fn test_unvisited_info_set_keeps_uniform_average() {
    // Once player 0 always bets, player 1 never sees a pass and its
    // post-pass information sets keep their uniform policy.
    let mut solver = quiet(KuhnPoker::new(), SolverConfig::vanilla());
    solver.run_iteration();
    assert_eq!(solver.get_average_strategy("0:p/1").unwrap(), vec![0.5, 0.5]);
    assert_eq!(solver.get_current_strategy("0:p/1").unwrap(), vec![0.5, 0.5]);
}

#[test]
fn test_random_policies_are_exploitable() {
    let game = KuhnPoker::new();
    let mut rng = StdRng::seed_from_u64(7);
    let mut table: FxHashMap<String, Vec<f64>> = FxHashMap::default();
    for card in 0..3 {
        for history in ["", "p", "b", "pb"] {
            let bet: f64 = rng.gen_range(0.05..0.95);
            table.insert(format!("{}:{}", card, history), vec![1.0 - bet, bet]);
        }
    }

    let policy = |state: &KuhnState| -> regret_solver::Result<Vec<f64>> {
        let player = game.current_player(state).unwrap_or(0);
        let key = game.info_state(state, player).key();
        Ok(table[&key].clone())
    };
    let exploitability = BestResponse::new().exploitability(&game, &policy).unwrap();

    // NashConv is non-negative and bounded by the largest stake.
    assert!(exploitability > 0.0);
    assert!(exploitability <= 2.0);
}

#[test]
fn test_leduc_exploitability_falls() {
    let config = SolverConfig::new(Algorithm::CfrPlus)
        .with_iterations(20)
        .with_eval_interval(10);
    let mut solver = quiet(LeducPoker::new(), config);
    let stats = solver.learn().unwrap();

    assert_eq!(stats.info_sets, 936);
    let curve: Vec<f64> = stats
        .exploitability_history
        .iter()
        .map(|p| p.exploitability)
        .collect();
    assert_eq!(curve.len(), 3);
    assert!(curve[1] < curve[0]);
    assert!(curve[2] < curve[1]);
}
