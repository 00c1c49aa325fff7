//! Update rules of the CFR family.
//!
//! Every variant shares the traversal; they differ only in three hooks run
//! per information set after its owner's traversal, in this order:
//!
//! 1. [`UpdateRule::update_regret`]: fold `imm_regret` into `regret`
//! 2. [`UpdateRule::cumulate_policy`]: add the current policy to the average
//! 3. [`UpdateRule::update_current_policy`]: derive the next policy
//!
//! `T` is the 1-based iteration number and is converted to `f64` before any
//! power is taken.
//!
//! | Variant | Regret update | Policy source | γ |
//! |---|---|---|---|
//! | CFR | `R + r` | `R` | 0 |
//! | CFR+ | `max(R + r, 0)` | `R` | 1 |
//! | Linear CFR | `R + r·T` | `R` | 1 |
//! | DCFR | `R·(T-1)^α/((T-1)^α+1) + r` if `R > 0`, β otherwise | `R` | 2 |
//! | DCFR+ | `max(R·(T-1)^α/((T-1)^α+1.5) + r, 0)` | `R` | 4 |
//! | PCFR+ | `max(R + r, 0)` | `max(R + r, 0)` | 2 |
//! | PDCFR+ | `max(R·d(T) + r, 0)` | `max(R·d(T+1) + r, 0)` | 5 |
//!
//! The average strategy uses `cum = cum·((T-1)/T)^γ + reach·policy`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cfr::config::ConfigError;
use crate::cfr::infoset::{regret_matching, InfoSet};

/// Which member of the CFR family to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Vanilla CFR.
    Cfr,
    /// CFR+ (regrets floored at zero).
    CfrPlus,
    /// Linear CFR (instantaneous regret weighted by `T`).
    LinearCfr,
    /// Discounted CFR.
    Dcfr,
    /// Discounted CFR+.
    DcfrPlus,
    /// Predictive CFR+.
    PcfrPlus,
    /// Predictive discounted CFR+.
    PdcfrPlus,
}

impl Algorithm {
    /// Every algorithm, in a stable order.
    pub const ALL: [Algorithm; 7] = [
        Algorithm::Cfr,
        Algorithm::CfrPlus,
        Algorithm::LinearCfr,
        Algorithm::Dcfr,
        Algorithm::DcfrPlus,
        Algorithm::PcfrPlus,
        Algorithm::PdcfrPlus,
    ];

    /// Canonical display name.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Cfr => "CFR",
            Algorithm::CfrPlus => "CFRPlus",
            Algorithm::LinearCfr => "LinearCFR",
            Algorithm::Dcfr => "DCFR",
            Algorithm::DcfrPlus => "DCFRPlus",
            Algorithm::PcfrPlus => "PCFRPlus",
            Algorithm::PdcfrPlus => "PDCFRPlus",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    /// Case-insensitive; `-` and `_` are ignored, so `dcfr-plus`,
    /// `DCFRPlus` and `dcfr_plus` are the same.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match norm.as_str() {
            "cfr" | "vanilla" => Ok(Algorithm::Cfr),
            "cfrplus" | "cfr+" => Ok(Algorithm::CfrPlus),
            "linearcfr" | "linear" | "lcfr" => Ok(Algorithm::LinearCfr),
            "dcfr" => Ok(Algorithm::Dcfr),
            "dcfrplus" | "dcfr+" => Ok(Algorithm::DcfrPlus),
            "pcfrplus" | "pcfr+" => Ok(Algorithm::PcfrPlus),
            "pdcfrplus" | "pdcfr+" => Ok(Algorithm::PdcfrPlus),
            _ => Err(ConfigError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// An algorithm together with its numeric parameters.
///
/// `alpha` and `beta` are only read by the discounted variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateRule {
    /// Which update formulas to apply.
    pub algorithm: Algorithm,
    /// Positive-regret discount exponent.
    pub alpha: f64,
    /// Negative-regret discount exponent (DCFR only).
    pub beta: f64,
    /// Average-policy discount exponent.
    pub gamma: f64,
}

impl Default for UpdateRule {
    fn default() -> Self {
        Self::new(Algorithm::Cfr)
    }
}

impl From<Algorithm> for UpdateRule {
    fn from(algorithm: Algorithm) -> Self {
        Self::new(algorithm)
    }
}

impl UpdateRule {
    /// Rule with the published default parameters of `algorithm`.
    pub fn new(algorithm: Algorithm) -> Self {
        let (alpha, beta, gamma) = match algorithm {
            Algorithm::Cfr => (0.0, 0.0, 0.0),
            Algorithm::CfrPlus => (0.0, 0.0, 1.0),
            Algorithm::LinearCfr => (0.0, 0.0, 1.0),
            Algorithm::Dcfr => (1.5, 0.0, 2.0),
            Algorithm::DcfrPlus => (1.5, 0.0, 4.0),
            Algorithm::PcfrPlus => (0.0, 0.0, 2.0),
            Algorithm::PdcfrPlus => (2.3, 0.0, 5.0),
        };
        Self {
            algorithm,
            alpha,
            beta,
            gamma,
        }
    }

    /// Builder method: set α.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Builder method: set β.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Builder method: set γ.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Validate the parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta), ("gamma", self.gamma)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidExponent(name, value));
            }
        }
        Ok(())
    }

    /// Run all three hooks on `s` for iteration `t`.
    pub fn apply<A>(&self, s: &mut InfoSet<A>, t: u64) {
        self.update_regret(s, t);
        self.cumulate_policy(s, t);
        self.update_current_policy(s, t);
    }

    /// Fold this iteration's instantaneous regret into the accumulated regret.
    pub fn update_regret<A>(&self, s: &mut InfoSet<A>, t: u64) {
        let t = t as f64;
        let imm = &s.imm_regret;
        let regret = &mut s.regret;
        match self.algorithm {
            Algorithm::Cfr => {
                for (r, &i) in regret.iter_mut().zip(imm) {
                    *r += i;
                }
            }
            Algorithm::CfrPlus | Algorithm::PcfrPlus => {
                for (r, &i) in regret.iter_mut().zip(imm) {
                    *r = (*r + i).max(0.0);
                }
            }
            Algorithm::LinearCfr => {
                for (r, &i) in regret.iter_mut().zip(imm) {
                    *r += i * t;
                }
            }
            Algorithm::Dcfr => {
                if t <= 1.0 {
                    regret.copy_from_slice(imm);
                    return;
                }
                let positive = discount(t, self.alpha, 1.0);
                let negative = discount(t, self.beta, 1.0);
                for (r, &i) in regret.iter_mut().zip(imm) {
                    let d = if *r > 0.0 { positive } else { negative };
                    *r = *r * d + i;
                }
            }
            Algorithm::DcfrPlus => {
                let d = discount(t, self.alpha, 1.5);
                for (r, &i) in regret.iter_mut().zip(imm) {
                    *r = (*r * d + i).max(0.0);
                }
            }
            Algorithm::PdcfrPlus => {
                let d = discount(t, self.alpha, 1.0);
                for (r, &i) in regret.iter_mut().zip(imm) {
                    *r = (*r * d + i).max(0.0);
                }
            }
        }
    }

    /// Add `reach * policy` to the cumulative policy, discounting the old sum.
    pub fn cumulate_policy<A>(&self, s: &mut InfoSet<A>, t: u64) {
        let reach = s.reach;
        if t <= 1 {
            for (c, &p) in s.cum_policy.iter_mut().zip(&s.policy) {
                *c = reach * p;
            }
            return;
        }
        let t = t as f64;
        let keep = ((t - 1.0) / t).powf(self.gamma);
        for (c, &p) in s.cum_policy.iter_mut().zip(&s.policy) {
            *c = *c * keep + reach * p;
        }
    }

    /// Derive the policy the next traversal will use.
    pub fn update_current_policy<A>(&self, s: &mut InfoSet<A>, t: u64) {
        match self.algorithm {
            Algorithm::Cfr
            | Algorithm::CfrPlus
            | Algorithm::LinearCfr
            | Algorithm::Dcfr
            | Algorithm::DcfrPlus => regret_matching(&s.regret, &mut s.policy),
            Algorithm::PcfrPlus => {
                let predicted: Vec<f64> = s
                    .regret
                    .iter()
                    .zip(&s.imm_regret)
                    .map(|(&r, &i)| (r + i).max(0.0))
                    .collect();
                regret_matching(&predicted, &mut s.policy);
            }
            Algorithm::PdcfrPlus => {
                let d = discount(t as f64 + 1.0, self.alpha, 1.0);
                let predicted: Vec<f64> = s
                    .regret
                    .iter()
                    .zip(&s.imm_regret)
                    .map(|(&r, &i)| (r * d + i).max(0.0))
                    .collect();
                regret_matching(&predicted, &mut s.policy);
            }
        }
    }
}

/// `(t-1)^exp / ((t-1)^exp + offset)`.
fn discount(t: f64, exp: f64, offset: f64) -> f64 {
    let w = (t - 1.0).powf(exp);
    w / (w + offset)
}
