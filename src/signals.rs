//! Ownership of host subscriptions.
//!
//! Every component keeps the subscription ids it created in a
//! [`Subscriptions`] table keyed by id, mapping to a component-local route.
//! Deliveries are routed by looking the id up; an id that has been released
//! no longer routes anywhere, so late deliveries for a destroyed scope are
//! dropped on the floor.

use std::collections::BTreeMap;

use crate::shell::{Shell, Signal, SubscriptionId};

#[derive(Debug)]
pub struct Subscriptions<T: Copy> {
    entries: BTreeMap<SubscriptionId, T>,
}

impl<T: Copy> Subscriptions<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn connect(&mut self, host: &mut dyn Shell, signal: Signal, route: T) -> SubscriptionId {
        let id = host.connect(signal);
        tracing::trace!(subscription = %id, ?signal, "connected");
        self.entries.insert(id, route);
        id
    }

    pub fn route(&self, id: SubscriptionId) -> Option<T> {
        self.entries.get(&id).copied()
    }

    pub fn owns(&self, id: SubscriptionId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn release(&mut self, host: &mut dyn Shell, id: SubscriptionId) -> Option<T> {
        let route = self.entries.remove(&id)?;
        host.disconnect(id);
        tracing::trace!(subscription = %id, "disconnected");
        Some(route)
    }

    /// Release every subscription whose route matches `pred`.
    pub fn release_where<F>(&mut self, host: &mut dyn Shell, mut pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let doomed: Vec<SubscriptionId> = self
            .entries
            .iter()
            .filter(|(_, route)| pred(route))
            .map(|(id, _)| *id)
            .collect();
        for id in &doomed {
            self.release(host, *id);
        }
        doomed.len()
    }

    pub fn release_all(&mut self, host: &mut dyn Shell) {
        for id in std::mem::take(&mut self.entries).into_keys() {
            host.disconnect(id);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Copy> Default for Subscriptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> Drop for Subscriptions<T> {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            tracing::warn!(
                leaked = self.entries.len(),
                "subscription table dropped without release"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimShell;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Route {
        A,
        B,
    }

    #[test]
    fn released_ids_stop_routing() {
        let mut host = SimShell::new(2);
        let mut subs = Subscriptions::new();
        let a = subs.connect(&mut host, Signal::Minimize, Route::A);
        let b = subs.connect(&mut host, Signal::Map, Route::B);
        assert_eq!(host.live_subscriptions(), 2);
        assert_eq!(subs.route(a), Some(Route::A));
        assert_eq!(subs.release(&mut host, a), Some(Route::A));
        assert_eq!(subs.route(a), None);
        assert_eq!(subs.release(&mut host, a), None);
        assert!(subs.owns(b));
        subs.release_all(&mut host);
        assert!(subs.is_empty());
        assert_eq!(host.live_subscriptions(), 0);
    }

    #[test]
    fn release_where_only_drops_matching_routes() {
        let mut host = SimShell::new(2);
        let mut subs = Subscriptions::new();
        subs.connect(&mut host, Signal::Minimize, Route::A);
        subs.connect(&mut host, Signal::Map, Route::B);
        subs.connect(&mut host, Signal::FocusAppChanged, Route::A);
        assert_eq!(subs.release_where(&mut host, |r| *r == Route::A), 2);
        assert_eq!(subs.len(), 1);
        assert_eq!(host.live_subscriptions(), 1);
        subs.release_all(&mut host);
    }
}
