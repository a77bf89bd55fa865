//! Optimistic-state reconciliation.
//!
//! Wraps a reducer so that actions tagged with a `begin` marker can later be
//! rolled back by a `revert` carrying the same transaction id, while the
//! effects of every other action (including other transactions still in
//! flight) are kept.

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::actions::Action;
use crate::workflow::{OptimistKind, TransactionId};

pub trait Reducer<S> {
    fn reduce(&self, state: &mut S, action: &Action);
}

impl<S, F> Reducer<S> for F
where
    F: Fn(&mut S, &Action),
{
    fn reduce(&self, state: &mut S, action: &Action) {
        self(state, action)
    }
}

#[derive(Debug, Clone)]
struct Recorded {
    action: Action,
    /// Set while the action belongs to a transaction that may still revert.
    transaction: Option<TransactionId>,
}

#[derive(Debug, Clone)]
pub struct OptimisticLayer<S, R> {
    reducer: R,
    current: S,
    /// State before the oldest action that could still be reverted.
    base: Option<S>,
    history: Vec<Recorded>,
    pending: HashSet<TransactionId>,
}

impl<S: Clone, R: Reducer<S>> OptimisticLayer<S, R> {
    pub fn new(initial: S, reducer: R) -> Self {
        Self {
            reducer,
            current: initial,
            base: None,
            history: Vec::new(),
            pending: HashSet::new(),
        }
    }

    pub fn state(&self) -> &S {
        &self.current
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: &TransactionId) -> bool {
        self.pending.contains(id)
    }

    pub fn apply(&mut self, action: Action) {
        match action.optimist {
            None => self.apply_plain(action),
            Some(marker) => match marker.kind {
                OptimistKind::Begin => self.begin(marker.id, action),
                OptimistKind::Commit => self.commit(marker.id, action),
                OptimistKind::Revert => self.revert(marker.id, action),
            },
        }
    }

    fn apply_plain(&mut self, action: Action) {
        self.reducer.reduce(&mut self.current, &action);
        if !self.pending.is_empty() {
            self.history.push(Recorded {
                action,
                transaction: None,
            });
        }
    }

    fn begin(&mut self, id: TransactionId, action: Action) {
        if self.pending.is_empty() {
            self.base = Some(self.current.clone());
            self.history.clear();
        }
        self.pending.insert(id);
        self.reducer.reduce(&mut self.current, &action);
        self.history.push(Recorded {
            action,
            transaction: Some(id),
        });
        debug!(transaction.id = %id, pending = self.pending.len(), "Optimistic update started");
    }

    fn commit(&mut self, id: TransactionId, action: Action) {
        if !self.pending.remove(&id) {
            warn!(transaction.id = %id, "Commit for unknown transaction");
        }
        for recorded in self.history.iter_mut() {
            if recorded.transaction == Some(id) {
                recorded.transaction = None;
            }
        }
        self.apply_recorded(action);
        self.settle();
    }

    fn revert(&mut self, id: TransactionId, action: Action) {
        if !self.pending.remove(&id) {
            warn!(transaction.id = %id, "Revert for unknown transaction");
            self.apply_recorded(action);
            self.settle();
            return;
        }

        self.history.retain(|recorded| recorded.transaction != Some(id));
        if let Some(base) = &self.base {
            let mut replayed = base.clone();
            for recorded in &self.history {
                self.reducer.reduce(&mut replayed, &recorded.action);
            }
            self.current = replayed;
        }
        debug!(transaction.id = %id, replayed = self.history.len(), "Optimistic update reverted");

        self.apply_recorded(action);
        self.settle();
    }

    /// Apply an action that is final regardless of other transactions.
    fn apply_recorded(&mut self, action: Action) {
        self.reducer.reduce(&mut self.current, &action);
        self.history.push(Recorded {
            action,
            transaction: None,
        });
    }

    fn settle(&mut self) {
        if self.pending.is_empty() {
            self.base = None;
            self.history.clear();
            return;
        }

        // Fold the settled prefix into the base so history stays short
        let settled = self
            .history
            .iter()
            .take_while(|recorded| recorded.transaction.is_none())
            .count();
        if settled == 0 {
            return;
        }
        if let Some(base) = self.base.as_mut() {
            for recorded in &self.history[..settled] {
                self.reducer.reduce(base, &recorded.action);
            }
        }
        self.history.drain(..settled);
    }
}
