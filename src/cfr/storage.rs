//! Storage for information sets.
//!
//! The store is an append-only arena of [`InfoSet`] records addressed by
//! [`InfoSetId`], plus a string lookup table that is only needed while the
//! tree is being enumerated and when an outside caller (the exploitability
//! oracle, a checkpoint) names an information set by key.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cfr::game::Action;
use crate::cfr::infoset::InfoSet;
use crate::error::{Result, SolverError};

/// Handle of an information set inside an [`InfoSetStore`].
pub type InfoSetId = usize;

/// Arena of information sets with a key index.
#[derive(Debug, Clone)]
pub struct InfoSetStore<A> {
    /// All information sets, in creation order.
    infosets: Vec<InfoSet<A>>,

    /// Composite key -> handle.
    index: FxHashMap<String, InfoSetId>,

    /// Handles grouped by acting player.
    by_player: Vec<Vec<InfoSetId>>,
}

impl<A: Action> Default for InfoSetStore<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> InfoSetStore<A> {
    /// Create new empty storage.
    pub fn new() -> Self {
        Self {
            infosets: Vec::new(),
            index: FxHashMap::default(),
            by_player: Vec::new(),
        }
    }

    /// Build the composite key that disambiguates players sharing a string.
    pub fn compose_key(info_key: &str, player: usize) -> String {
        format!("{}/{}", info_key, player)
    }

    /// Return the handle for `key`, creating the information set on first sight.
    ///
    /// Repeated calls with the same key return the same handle. A repeated
    /// call whose actions differ from the recorded ones, in identity or
    /// order, is an error.
    pub fn lookup_or_create(
        &mut self,
        key: String,
        player: usize,
        actions: Vec<A>,
    ) -> Result<InfoSetId> {
        if let Some(&id) = self.index.get(&key) {
            let existing = &self.infosets[id];
            if existing.actions() != actions.as_slice() {
                return Err(SolverError::InconsistentActions {
                    key,
                    expected: existing.actions().iter().map(Action::label).collect(),
                    found: actions.iter().map(Action::label).collect(),
                });
            }
            debug_assert_eq!(existing.player(), player, "player changed for {}", key);
            return Ok(id);
        }
        if actions.is_empty() {
            return Err(SolverError::InvalidState(format!(
                "decision state `{}` has no legal actions",
                key
            )));
        }

        let id = self.infosets.len();
        if self.by_player.len() <= player {
            self.by_player.resize_with(player + 1, Vec::new);
        }
        self.by_player[player].push(id);
        self.index.insert(key.clone(), id);
        self.infosets.push(InfoSet::new(key, player, actions));
        Ok(id)
    }

    /// Handle for a composite key, if it was enumerated.
    pub fn lookup(&self, key: &str) -> Option<InfoSetId> {
        self.index.get(key).copied()
    }

    /// Information set by handle.
    pub fn get(&self, id: InfoSetId) -> &InfoSet<A> {
        &self.infosets[id]
    }

    /// Mutable information set by handle.
    pub fn get_mut(&mut self, id: InfoSetId) -> &mut InfoSet<A> {
        &mut self.infosets[id]
    }

    /// Information set by composite key.
    pub fn by_key(&self, key: &str) -> Option<&InfoSet<A>> {
        self.lookup(key).map(|id| &self.infosets[id])
    }

    /// Handles of the information sets where `player` acts.
    pub fn owned_by(&self, player: usize) -> &[InfoSetId] {
        self.by_player.get(player).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Run `f` on every information set where `player` acts.
    pub fn for_each_owned(&mut self, player: usize, mut f: impl FnMut(&mut InfoSet<A>)) {
        if let Some(ids) = self.by_player.get(player) {
            for &id in ids {
                f(&mut self.infosets[id]);
            }
        }
    }

    /// Iterate over all information sets.
    pub fn iter(&self) -> impl Iterator<Item = &InfoSet<A>> {
        self.infosets.iter()
    }

    /// Get the number of information sets stored.
    pub fn len(&self) -> usize {
        self.infosets.len()
    }

    /// Whether nothing has been enumerated yet.
    pub fn is_empty(&self) -> bool {
        self.infosets.is_empty()
    }

    /// Reset every information set to uniform policy and zero accumulators.
    pub fn reset(&mut self) {
        self.infosets.iter_mut().for_each(InfoSet::reset);
    }

    /// Export storage to serializable format.
    pub fn export(&self) -> StorageExport {
        StorageExport {
            infosets: self
                .infosets
                .iter()
                .map(|s| InfoSetSnapshot {
                    key: s.key().to_string(),
                    player: s.player(),
                    actions: s.actions().iter().map(Action::label).collect(),
                    policy: s.policy().to_vec(),
                    regret: s.regret().to_vec(),
                    cum_policy: s.cum_policy().to_vec(),
                    average_policy: s.average_policy(),
                    imm_regret: s.imm_regret_snapshot().to_vec(),
                })
                .collect(),
        }
    }

    /// Import storage from serialized format.
    ///
    /// Every snapshot must name an enumerated information set with the same
    /// number of actions; nothing is modified if any of them does not.
    pub fn import(&mut self, data: &StorageExport) -> Result<()> {
        let mut targets = Vec::with_capacity(data.infosets.len());
        for snap in &data.infosets {
            let id = self.lookup(&snap.key).ok_or_else(|| {
                SolverError::CheckpointMismatch(format!("unknown information set `{}`", snap.key))
            })?;
            let n = self.infosets[id].num_actions();
            let lengths = [
                snap.policy.len(),
                snap.regret.len(),
                snap.cum_policy.len(),
                snap.imm_regret.len(),
            ];
            if lengths.iter().any(|&l| l != n) {
                return Err(SolverError::CheckpointMismatch(format!(
                    "`{}` has {} actions, snapshot disagrees",
                    snap.key, n
                )));
            }
            targets.push(id);
        }

        for (id, snap) in targets.into_iter().zip(&data.infosets) {
            let s = &mut self.infosets[id];
            s.policy.copy_from_slice(&snap.policy);
            s.regret.copy_from_slice(&snap.regret);
            s.cum_policy.copy_from_slice(&snap.cum_policy);
            s.imm_regret_snapshot.copy_from_slice(&snap.imm_regret);
            s.imm_regret.iter_mut().for_each(|r| *r = 0.0);
            s.reach = 0.0;
        }
        Ok(())
    }
}

/// Serializable view of one information set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoSetSnapshot {
    /// Composite key.
    pub key: String,
    /// Acting player.
    pub player: usize,
    /// Action labels.
    pub actions: Vec<String>,
    /// Current policy.
    pub policy: Vec<f64>,
    /// Accumulated regret.
    pub regret: Vec<f64>,
    /// Cumulative policy.
    pub cum_policy: Vec<f64>,
    /// Normalized average policy (derived, ignored on import).
    pub average_policy: Vec<f64>,
    /// Last finalized instantaneous regret.
    pub imm_regret: Vec<f64>,
}

/// Serializable export format for storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageExport {
    /// One snapshot per information set, in creation order.
    pub infosets: Vec<InfoSetSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Action for char {
        fn label(&self) -> String {
            self.to_string()
        }
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let mut store = InfoSetStore::new();
        let a = store.lookup_or_create("x/0".into(), 0, vec!['p', 'b']).unwrap();
        let b = store.lookup_or_create("x/0".into(), 0, vec!['p', 'b']).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.owned_by(0), &[a]);
        assert!(store.owned_by(1).is_empty());
    }

    #[test]
    fn test_same_string_different_players_are_distinct() {
        let mut store = InfoSetStore::new();
        let k0 = InfoSetStore::<char>::compose_key("x", 0);
        let k1 = InfoSetStore::<char>::compose_key("x", 1);
        let a = store.lookup_or_create(k0, 0, vec!['p', 'b']).unwrap();
        let b = store.lookup_or_create(k1, 1, vec!['p', 'b']).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.get(b).key(), "x/1");
    }

    #[test]
    fn test_inconsistent_actions_rejected() {
        let mut store = InfoSetStore::new();
        store.lookup_or_create("x/0".into(), 0, vec!['p', 'b']).unwrap();
        let err = store
            .lookup_or_create("x/0".into(), 0, vec!['p'])
            .unwrap_err();
        match err {
            SolverError::InconsistentActions { expected, found, .. } => {
                assert_eq!(expected, vec!["p", "b"]);
                assert_eq!(found, vec!["p"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_same_count_different_actions_rejected() {
        let mut store = InfoSetStore::new();
        store.lookup_or_create("x/0".into(), 0, vec!['x', 'y']).unwrap();
        let err = store
            .lookup_or_create("x/0".into(), 0, vec!['y', 'z'])
            .unwrap_err();
        assert!(matches!(err, SolverError::InconsistentActions { .. }));
        assert!(store
            .lookup_or_create("x/0".into(), 0, vec!['y', 'x'])
            .is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_empty_action_set_rejected() {
        let mut store: InfoSetStore<char> = InfoSetStore::new();
        assert!(matches!(
            store.lookup_or_create("x/0".into(), 0, vec![]),
            Err(SolverError::InvalidState(_))
        ));
    }

    #[test]
    fn test_import_restores_export() {
        let mut store = InfoSetStore::new();
        let id = store.lookup_or_create("x/0".into(), 0, vec!['p', 'b']).unwrap();
        store.get_mut(id).regret = vec![1.0, -1.0];
        store.get_mut(id).cum_policy = vec![2.0, 6.0];
        let exported = store.export();
        assert_eq!(exported.infosets[0].average_policy, vec![0.25, 0.75]);

        store.reset();
        store.import(&exported).unwrap();
        assert_eq!(store.get(id).regret(), &[1.0, -1.0]);
        assert_eq!(store.get(id).cum_policy(), &[2.0, 6.0]);
    }

    #[test]
    fn test_import_rejects_unknown_key() {
        let mut store: InfoSetStore<char> = InfoSetStore::new();
        let data = StorageExport {
            infosets: vec![InfoSetSnapshot {
                key: "missing/0".into(),
                player: 0,
                actions: vec!["p".into()],
                policy: vec![1.0],
                regret: vec![0.0],
                cum_policy: vec![0.0],
                average_policy: vec![1.0],
                imm_regret: vec![0.0],
            }],
        };
        assert!(matches!(
            store.import(&data),
            Err(SolverError::CheckpointMismatch(_))
        ));
    }
}
