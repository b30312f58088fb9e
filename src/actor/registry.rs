//! Subscription table mediating broadcasts.
//!
//! The registry maps a signal name to the set of actors currently
//! subscribed to it. It holds only addresses, never the actors themselves;
//! a subscriber whose mailbox is gone is dropped on the next broadcast.

use super::mailbox::{Addr, Recipient};
use super::signal::Signal;
use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Signal name -> subscriber name -> address.
type Subscribers<T> = DashMap<String, HashMap<String, Addr<T>>>;

/// Thread-safe, cloneable handle to a subscription table.
///
/// Clones share the same table. Actors are identified by name, so a name
/// appears at most once per subscriber set; registering a different mailbox
/// under a name already present replaces the old subscription.
pub struct Registry<T> {
    subscribers: Arc<Subscribers<T>>,
}

impl<T> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.subscribers.len())
            .finish()
    }
}

impl<T> Registry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(DashMap::new()),
        }
    }

    /// Subscribe `actor` to `name`.
    ///
    /// Returns `false` if this same mailbox was already subscribed.
    pub fn register<R>(&self, name: impl Into<String>, actor: &R) -> bool
    where
        R: Recipient<T> + ?Sized,
    {
        let name = name.into();
        let addr = actor.addr();
        let mut set = self.subscribers.entry(name.clone()).or_default();
        if set
            .get(addr.name())
            .is_some_and(|current| current.same_mailbox(addr))
        {
            return false;
        }
        if set.insert(addr.name().to_string(), addr.clone()).is_some() {
            tracing::debug!(signal = %name, actor = addr.name(), "replaced stale subscription");
        } else {
            tracing::debug!(signal = %name, actor = addr.name(), "registered");
        }
        true
    }

    /// Unsubscribe the actor called `actor` from `name`.
    ///
    /// Returns `false` if it was not subscribed.
    pub fn unregister(&self, name: &str, actor: &str) -> bool {
        let removed = self
            .subscribers
            .get_mut(name)
            .is_some_and(|mut set| set.remove(actor).is_some());
        if removed {
            tracing::debug!(signal = name, actor, "unregistered");
            self.subscribers.remove_if(name, |_, set| set.is_empty());
        }
        removed
    }

    /// Subscribe `actor` to `name` if it is not subscribed, unsubscribe it
    /// otherwise.
    ///
    /// Returns whether the actor is subscribed after the call.
    pub fn toggle_registered<R>(&self, name: impl Into<String>, actor: &R) -> bool
    where
        R: Recipient<T> + ?Sized,
    {
        let name = name.into();
        let addr = actor.addr();
        let registered = {
            let mut set = self.subscribers.entry(name.clone()).or_default();
            // An entry left behind by an earlier actor of the same name is
            // replaced, not toggled off.
            if set
                .get(addr.name())
                .is_some_and(|current| current.same_mailbox(addr))
            {
                set.remove(addr.name());
                false
            } else {
                set.insert(addr.name().to_string(), addr.clone());
                true
            }
        };
        tracing::debug!(signal = %name, actor = addr.name(), registered, "toggled");
        if !registered {
            self.subscribers.remove_if(&name, |_, set| set.is_empty());
        }
        registered
    }

    /// Whether the actor called `actor` is subscribed to `name`.
    pub fn is_registered(&self, name: &str, actor: &str) -> bool {
        self.subscribers
            .get(name)
            .is_some_and(|set| set.contains_key(actor))
    }

    /// Names of the actors subscribed to `name`, sorted.
    pub fn subscribers(&self, name: &str) -> Vec<String> {
        let mut actors: Vec<String> = self
            .subscribers
            .get(name)
            .map(|set| set.keys().cloned().collect())
            .unwrap_or_default();
        actors.sort();
        actors
    }

    /// Signal names with at least one subscriber, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .subscribers
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Remove the actor called `actor` from every subscriber set.
    ///
    /// Returns how many subscriptions were removed.
    pub fn unregister_all(&self, actor: &str) -> usize {
        let mut removed = 0;
        self.subscribers.retain(|_, set| {
            if set.remove(actor).is_some() {
                removed += 1;
            }
            !set.is_empty()
        });
        if removed > 0 {
            tracing::debug!(actor, removed, "unregistered from all signals");
        }
        removed
    }

    /// Deliver `signal` to every actor subscribed to its name.
    ///
    /// Each subscriber receives the same shared signal. Delivery order across
    /// subscribers is unspecified. Broadcasting a name nobody subscribed to
    /// is a no-op. Returns the number of mailboxes the signal reached.
    pub fn broadcast(&self, signal: Signal<T>) -> usize {
        // Snapshot the set so the entry lock is not held while sending.
        let targets: Vec<Addr<T>> = match self.subscribers.get(signal.name()) {
            Some(set) => set.values().cloned().collect(),
            None => return 0,
        };

        let signal = Arc::new(signal);
        let mut delivered = 0;
        for addr in targets {
            if addr.send_shared(Arc::clone(&signal)).is_ok() {
                tracing::trace!(signal = signal.name(), actor = addr.name(), "delivered");
                delivered += 1;
            } else {
                tracing::warn!(
                    signal = signal.name(),
                    actor = addr.name(),
                    "mailbox closed; dropping subscriber"
                );
                self.prune(signal.name(), &addr);
            }
        }
        delivered
    }

    fn prune(&self, name: &str, addr: &Addr<T>) {
        if let Some(mut set) = self.subscribers.get_mut(name) {
            // Only drop the entry if it still points at the dead mailbox.
            if set
                .get(addr.name())
                .is_some_and(|current| current.same_mailbox(addr))
            {
                set.remove(addr.name());
            }
        }
        self.subscribers.remove_if(name, |_, set| set.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::mailbox::{mailbox, Mailbox};
    use crate::actor::signal::Envelope;

    fn payloads(mailbox: &Mailbox<i32>) -> Vec<i32> {
        mailbox
            .drain()
            .into_iter()
            .filter_map(|envelope| match envelope {
                Envelope::Signal(signal) => Some(*signal.data()),
                Envelope::Wake => None,
            })
            .collect()
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = Registry::new();
        let (addr, mailbox) = mailbox::<i32>("Beeper");

        assert!(registry.register("Beep", &addr));
        assert!(!registry.register("Beep", &addr));
        assert!(registry.is_registered("Beep", "Beeper"));
        assert_eq!(registry.subscribers("Beep"), vec!["Beeper".to_string()]);

        assert_eq!(registry.broadcast(Signal::new("Beep", "UI", 1)), 1);
        assert_eq!(payloads(&mailbox), vec![1]);
    }

    #[test]
    fn test_unregister_twice_is_noop() {
        let registry = Registry::new();
        let (addr, _mailbox) = mailbox::<i32>("Mover");
        registry.register("Stop", &addr);

        assert!(registry.unregister("Stop", "Mover"));
        assert!(!registry.unregister("Stop", "Mover"));
        assert!(!registry.is_registered("Stop", "Mover"));
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_toggle_follows_parity() {
        let registry = Registry::new();
        let (addr, _mailbox) = mailbox::<i32>("GUI");

        for round in 1..=7 {
            let registered = registry.toggle_registered("Floor", &addr);
            assert_eq!(registered, round % 2 == 1);
            assert_eq!(registry.is_registered("Floor", "GUI"), round % 2 == 1);
        }

        // register after an odd number of toggles changes nothing
        assert!(!registry.register("Floor", &addr));
        assert!(!registry.toggle_registered("Floor", &addr));
        assert!(!registry.is_registered("Floor", "GUI"));
    }

    #[test]
    fn test_broadcast_reaches_only_subscribers() {
        let registry = Registry::new();
        let (beeper, beeper_box) = mailbox::<i32>("Beeper");
        let (monitor, monitor_box) = mailbox::<i32>("Monitor");
        registry.register("Beep", &beeper);
        registry.register("Servo", &monitor);

        assert_eq!(registry.broadcast(Signal::new("Beep", "UI", 40)), 1);
        assert_eq!(registry.broadcast(Signal::new("Beep", "UI", 0)), 1);
        assert_eq!(registry.broadcast(Signal::new("Servo", "UI", 90)), 1);

        assert_eq!(payloads(&beeper_box), vec![40, 0]);
        assert_eq!(payloads(&monitor_box), vec![90]);
    }

    #[test]
    fn test_broadcast_without_subscribers_is_noop() {
        let registry: Registry<i32> = Registry::new();
        assert_eq!(registry.broadcast(Signal::new("Nobody", "UI", 1)), 0);
    }

    #[test]
    fn test_broadcast_shares_one_signal() {
        let registry = Registry::new();
        let (raw, raw_box) = mailbox::<i32>("Raw");
        let (filtered, filtered_box) = mailbox::<i32>("Filtered");
        registry.register("Floor", &raw);
        registry.register("Floor", &filtered);

        assert_eq!(registry.broadcast(Signal::new("Floor", "Monitor", 12)), 2);

        let mut first = raw_box.drain();
        let mut second = filtered_box.drain();
        match (first.pop(), second.pop()) {
            (Some(Envelope::Signal(a)), Some(Envelope::Signal(b))) => {
                assert!(Arc::ptr_eq(&a, &b));
                assert_eq!(a, b);
            }
            _ => panic!("both subscribers should hold the signal"),
        }
    }

    #[test]
    fn test_broadcast_prunes_closed_mailboxes() {
        let registry = Registry::new();
        let (live, live_box) = mailbox::<i32>("Live");
        let (dead, dead_box) = mailbox::<i32>("Dead");
        registry.register("PSD", &live);
        registry.register("PSD", &dead);
        drop(dead_box);

        assert_eq!(registry.broadcast(Signal::new("PSD", "Monitor", 5)), 1);
        assert_eq!(registry.subscribers("PSD"), vec!["Live".to_string()]);
        assert_eq!(payloads(&live_box), vec![5]);
    }

    #[test]
    fn test_new_actor_replaces_stale_subscription() {
        let registry = Registry::new();
        let (old, old_box) = mailbox::<i32>("Beeper");
        registry.register("Beep", &old);
        registry.register("Servo", &old);
        drop(old_box);

        let (new, new_box) = mailbox::<i32>("Beeper");
        assert!(registry.register("Beep", &new));
        assert!(!registry.register("Beep", &new));
        assert!(registry.toggle_registered("Servo", &new));

        assert_eq!(registry.broadcast(Signal::new("Beep", "UI", 40)), 1);
        assert_eq!(registry.broadcast(Signal::new("Servo", "UI", 90)), 1);
        assert_eq!(payloads(&new_box), vec![40, 90]);
        assert!(registry.is_registered("Beep", "Beeper"));
        assert!(registry.is_registered("Servo", "Beeper"));
    }

    #[test]
    fn test_unregister_all() {
        let registry = Registry::new();
        let (gui, _gui_box) = mailbox::<i32>("GUI");
        let (other, _other_box) = mailbox::<i32>("Other");
        for name in ["Floor", "Proximity", "PSD"] {
            registry.register(name, &gui);
        }
        registry.register("Floor", &other);

        assert_eq!(registry.unregister_all("GUI"), 3);
        assert_eq!(registry.names(), vec!["Floor".to_string()]);
        assert_eq!(registry.unregister_all("GUI"), 0);
    }

    #[test]
    fn test_clones_share_table() {
        let registry = Registry::new();
        let view = registry.clone();
        let (addr, _mailbox) = mailbox::<i32>("Beeper");
        registry.register("Beep", &addr);
        assert!(view.is_registered("Beep", "Beeper"));
    }
}
