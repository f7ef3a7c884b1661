//! Filter controller: owns pending vs. applied selections and notifies listeners.
//!
//! Notifications are synchronous and run in registration order. No internal lock is held
//! while a listener or view runs, so listeners are free to read the controller back.

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::domain::{FilterGroupKey, OptionValue, Selections};
use tracing::{debug, info};

use crate::feedback::{Notice, NoticeKind, NoticeSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterEventKind {
    /// Pending selections changed (a control was toggled).
    Change,
    /// Pending selections were committed by apply or reset.
    Apply,
}

pub trait FilterListener: Send + Sync {
    fn on_filters(&self, kind: FilterEventKind, selections: &Selections);
}

/// Adapts a closure into a [`FilterListener`].
pub struct FnListener<F>(pub F);

impl<F> FilterListener for FnListener<F>
where
    F: Fn(FilterEventKind, &Selections) + Send + Sync,
{
    fn on_filters(&self, kind: FilterEventKind, selections: &Selections) {
        (self.0)(kind, selections)
    }
}

/// A control whose visual state mirrors one group's pending selection.
pub trait SelectionView: Send + Sync {
    fn group(&self) -> &FilterGroupKey;
    fn sync_checked(&self, selected: &BTreeSet<OptionValue>);
}

#[derive(Default)]
struct ControllerState {
    pending: Selections,
    applied: Selections,
}

struct Subscription {
    kind: FilterEventKind,
    listener: Arc<dyn FilterListener>,
}

pub struct FilterController {
    state: Mutex<ControllerState>,
    subscriptions: Mutex<Vec<Subscription>>,
    views: Mutex<Vec<Arc<dyn SelectionView>>>,
    notices: Arc<dyn NoticeSink>,
}

impl FilterController {
    pub fn new(notices: Arc<dyn NoticeSink>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ControllerState::default()),
            subscriptions: Mutex::new(Vec::new()),
            views: Mutex::new(Vec::new()),
            notices,
        })
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register_group(&self, key: &FilterGroupKey) {
        let mut state = self.state();
        let added = state.pending.ensure_group(key);
        state.applied.ensure_group(key);
        if added {
            debug!(group = %key, "filter group registered");
        }
    }

    /// Replaces the pending selection of `key` and fires [`FilterEventKind::Change`].
    ///
    /// Unknown groups are created on the fly rather than rejected.
    pub fn update_group(&self, key: &FilterGroupKey, values: impl IntoIterator<Item = OptionValue>) {
        let pending = {
            let mut state = self.state();
            state.pending.set_group(key.clone(), values);
            debug!(group = %key, values = ?state.pending.values(key.as_str()), "pending filter updated");
            state.pending.clone()
        };
        self.notify(FilterEventKind::Change, &pending);
    }

    /// Programmatic pending update that also re-syncs the group's controls.
    pub fn set_group(&self, key: &FilterGroupKey, values: impl IntoIterator<Item = OptionValue>) {
        let (pending, selected) = {
            let mut state = self.state();
            state.pending.set_group(key.clone(), values);
            (state.pending.clone(), state.pending.values(key.as_str()))
        };
        for view in self.views().iter().filter(|view| view.group() == key) {
            view.sync_checked(&selected);
        }
        self.notify(FilterEventKind::Change, &pending);
    }

    /// Installs an initial selection as both pending and applied without notifying.
    pub fn seed_group(&self, key: &FilterGroupKey, values: impl IntoIterator<Item = OptionValue>) {
        let values: BTreeSet<OptionValue> = values.into_iter().collect();
        let mut state = self.state();
        state.pending.set_group(key.clone(), values.iter().cloned());
        state.applied.set_group(key.clone(), values);
        debug!(group = %key, "filter group seeded");
    }

    pub fn apply(&self) {
        let applied = {
            let mut state = self.state();
            state.applied = state.pending.clone();
            state.applied.clone()
        };
        info!(groups = applied.len(), active = applied.has_active(), "filters applied");
        self.notify(FilterEventKind::Apply, &applied);
        self.notices
            .show(Notice::new("Filters applied!", NoticeKind::Success));
    }

    pub fn reset(&self) {
        let applied = {
            let mut state = self.state();
            let keys: Vec<FilterGroupKey> = state
                .pending
                .keys()
                .chain(state.applied.keys())
                .cloned()
                .collect();
            for key in &keys {
                state.pending.ensure_group(key);
            }
            state.pending.clear_values();
            state.applied = state.pending.clone();
            state.applied.clone()
        };

        let empty = BTreeSet::new();
        for view in self.views().iter() {
            view.sync_checked(&empty);
        }

        info!(groups = applied.len(), "filters reset");
        self.notify(FilterEventKind::Apply, &applied);
        self.notices.show(Notice::new("Filters reset!", NoticeKind::Info));
    }

    pub fn applied(&self) -> Selections {
        self.state().applied.clone()
    }

    pub fn pending(&self) -> Selections {
        self.state().pending.clone()
    }

    pub fn applied_group(&self, key: &str) -> BTreeSet<OptionValue> {
        self.state().applied.values(key)
    }

    pub fn pending_group(&self, key: &str) -> BTreeSet<OptionValue> {
        self.state().pending.values(key)
    }

    pub fn group_keys(&self) -> Vec<FilterGroupKey> {
        let state = self.state();
        let keys: BTreeSet<&FilterGroupKey> =
            state.pending.keys().chain(state.applied.keys()).collect();
        keys.into_iter().cloned().collect()
    }

    /// Registers `listener` for `kind`. Repeated registrations are all kept.
    pub fn subscribe(&self, kind: FilterEventKind, listener: Arc<dyn FilterListener>) {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscription { kind, listener });
    }

    pub fn subscribe_fn<F>(&self, kind: FilterEventKind, callback: F)
    where
        F: Fn(FilterEventKind, &Selections) + Send + Sync + 'static,
    {
        self.subscribe(kind, Arc::new(FnListener(callback)));
    }

    pub fn attach_view(&self, view: Arc<dyn SelectionView>) {
        self.views
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(view);
    }

    fn views(&self) -> Vec<Arc<dyn SelectionView>> {
        self.views
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn notify(&self, kind: FilterEventKind, selections: &Selections) {
        let listeners: Vec<Arc<dyn FilterListener>> = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|subscription| subscription.kind == kind)
            .map(|subscription| Arc::clone(&subscription.listener))
            .collect();
        debug!(?kind, listeners = listeners.len(), "dispatching filter event");
        for listener in listeners {
            listener.on_filters(kind, selections);
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
