//! Per-decision-point solver state.
//!
//! An [`InfoSet`] owns every accumulator the CFR family needs at one
//! information set. All per-action quantities are stored as dense vectors
//! indexed like `actions`, which never change after creation.

/// Solver state at one (information-string, player) pair.
#[derive(Debug, Clone)]
pub struct InfoSet<A> {
    key: String,
    player: usize,
    actions: Vec<A>,
    /// Current strategy used by traversals.
    pub(crate) policy: Vec<f64>,
    /// Accumulator for the average strategy.
    pub(crate) cum_policy: Vec<f64>,
    /// Accumulated regret; meaning depends on the update rule.
    pub(crate) regret: Vec<f64>,
    /// Instantaneous counterfactual regret of the running iteration.
    pub(crate) imm_regret: Vec<f64>,
    /// `imm_regret` as it was before the last reset.
    pub(crate) imm_regret_snapshot: Vec<f64>,
    /// Own reach probability summed over the histories of this set.
    pub(crate) reach: f64,
}

impl<A> InfoSet<A> {
    /// Create a fresh information set with a uniform policy and zeroed accumulators.
    ///
    /// `actions` must not be empty.
    pub fn new(key: String, player: usize, actions: Vec<A>) -> Self {
        let n = actions.len();
        Self {
            key,
            player,
            actions,
            policy: uniform(n),
            cum_policy: vec![0.0; n],
            regret: vec![0.0; n],
            imm_regret: vec![0.0; n],
            imm_regret_snapshot: vec![0.0; n],
            reach: 0.0,
        }
    }

    /// Composite key (`information-string/player`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Acting player.
    pub fn player(&self) -> usize {
        self.player
    }

    /// Legal actions, in the order every per-action vector uses.
    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    /// Number of legal actions.
    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// Current policy.
    pub fn policy(&self) -> &[f64] {
        &self.policy
    }

    /// Cumulative policy accumulator.
    pub fn cum_policy(&self) -> &[f64] {
        &self.cum_policy
    }

    /// Accumulated regret.
    pub fn regret(&self) -> &[f64] {
        &self.regret
    }

    /// Instantaneous regret of the running iteration.
    pub fn imm_regret(&self) -> &[f64] {
        &self.imm_regret
    }

    /// Instantaneous regret from before the last reset.
    pub fn imm_regret_snapshot(&self) -> &[f64] {
        &self.imm_regret_snapshot
    }

    /// Own reach accumulated during the running traversal.
    pub fn reach(&self) -> f64 {
        self.reach
    }

    /// Average policy: `cum_policy` renormalized, uniform if it sums to zero.
    pub fn average_policy(&self) -> Vec<f64> {
        let total: f64 = self.cum_policy.iter().sum();
        if total > 0.0 {
            self.cum_policy.iter().map(|&x| x / total).collect()
        } else {
            uniform(self.actions.len())
        }
    }

    /// Set the current policy by regret matching on `regrets`.
    pub fn match_regrets(&mut self, regrets: &[f64]) {
        regret_matching(regrets, &mut self.policy);
    }

    /// Zero the per-iteration temporaries, keeping a copy of `imm_regret`.
    pub fn clear_temp(&mut self) {
        self.imm_regret_snapshot.copy_from_slice(&self.imm_regret);
        self.imm_regret.iter_mut().for_each(|r| *r = 0.0);
        self.reach = 0.0;
    }

    /// Back to the state right after creation.
    pub fn reset(&mut self) {
        let n = self.actions.len();
        self.policy = uniform(n);
        for v in [
            &mut self.cum_policy,
            &mut self.regret,
            &mut self.imm_regret,
            &mut self.imm_regret_snapshot,
        ] {
            v.iter_mut().for_each(|x| *x = 0.0);
        }
        self.reach = 0.0;
    }
}

/// Uniform distribution over `n` actions.
pub fn uniform(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

/// Regret matching: strategy proportional to positive regrets.
///
/// Writes into `out`, falling back to uniform when no regret is positive.
pub fn regret_matching(regrets: &[f64], out: &mut [f64]) {
    debug_assert_eq!(regrets.len(), out.len());
    let sum: f64 = regrets.iter().map(|&r| r.max(0.0)).sum();
    if sum > 0.0 {
        for (p, &r) in out.iter_mut().zip(regrets) {
            *p = r.max(0.0) / sum;
        }
    } else {
        let u = 1.0 / out.len() as f64;
        out.iter_mut().for_each(|p| *p = u);
    }
}
